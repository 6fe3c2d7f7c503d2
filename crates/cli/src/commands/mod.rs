//! CLI command implementations.

pub mod migrate;
pub mod user;

use recipe_accounts_server::config::ConfigError;
use recipe_accounts_server::services::auth::AuthError;
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying migrations failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Account operation failed.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Read the database URL (`ACCOUNTS_DATABASE_URL`, then `DATABASE_URL`).
fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("ACCOUNTS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("ACCOUNTS_DATABASE_URL"))
}

/// Connect to the accounts database.
async fn connect() -> Result<PgPool, CliError> {
    let url = database_url()?;

    tracing::info!("Connecting to accounts database...");
    Ok(recipe_accounts_server::db::create_pool(&url).await?)
}
