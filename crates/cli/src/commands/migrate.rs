//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! accounts-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ACCOUNTS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded at build
//! time:
//! ```text
//! migrations/
//! ├── 20260301000001_create_users.sql
//! └── 20260301000002_create_auth_tokens.sql
//! ```

use super::{CliError, connect};

/// Run the accounts database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running accounts migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Accounts migrations complete!");
    Ok(())
}
