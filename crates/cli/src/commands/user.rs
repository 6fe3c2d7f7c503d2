//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a regular user
//! accounts-cli user create -e cook@example.com -p 'correct horse' -n "Cook"
//!
//! # Create a superuser
//! accounts-cli user create -e admin@example.com -p 'correct horse' --superuser
//!
//! # Deactivate a user (blocks login and existing tokens)
//! accounts-cli user deactivate -e cook@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `ACCOUNTS_DATABASE_URL` - `PostgreSQL` connection string
//! - `ACCOUNTS_MIN_PASSWORD_LENGTH`, `ACCOUNTS_ARGON2_*` - as for the server

use std::sync::Arc;

use recipe_accounts_server::config::AccountsConfig;
use recipe_accounts_server::db::PgUserStore;
use recipe_accounts_server::services::auth::{Passwords, UserDirectory, validate_password};

use super::{CliError, connect};

/// Build a directory over the accounts database using the server's settings.
async fn directory() -> Result<(UserDirectory, AccountsConfig), CliError> {
    let config = AccountsConfig::from_env()?;
    let pool = connect().await?;

    let passwords = Arc::new(Passwords::new(config.hashing)?);
    let directory = UserDirectory::new(Arc::new(PgUserStore::new(pool)), passwords);

    Ok((directory, config))
}

/// Create a new user.
///
/// # Arguments
///
/// * `email` - User's email address (normalized to lowercase)
/// * `password` - Initial password
/// * `name` - Optional display name
/// * `superuser` - Grant staff and superuser flags
///
/// # Errors
///
/// Returns `CliError::Auth` if the email is invalid or taken, or the password
/// is too short.
pub async fn create(
    email: &str,
    password: &str,
    name: Option<&str>,
    superuser: bool,
) -> Result<(), CliError> {
    let (directory, config) = directory().await?;
    validate_password(password, config.min_password_length)?;

    let user = if superuser {
        directory
            .create_superuser(Some(email), password, name)
            .await?
    } else {
        directory.create_user(Some(email), password, name).await?
    };

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Superuser: {}",
        user.id,
        user.email,
        user.is_superuser
    );

    Ok(())
}

/// Deactivate a user by email.
///
/// # Errors
///
/// Returns `CliError::Auth` if no user has this email.
pub async fn deactivate(email: &str) -> Result<(), CliError> {
    let (directory, _) = directory().await?;

    let user = directory.deactivate(email).await?;
    tracing::info!("User deactivated. ID: {}, Email: {}", user.id, user.email);

    Ok(())
}
