//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during account and token operations.
///
/// Callers see three families: validation (`InvalidEmail`, `MissingField`,
/// `WeakPassword`), conflict (`UserAlreadyExists`) and authentication
/// (`InvalidCredentials`). The rest are server-side failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] recipe_accounts_core::EmailError),

    /// A required field was absent.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Invalid credentials (wrong password, unknown or inactive user, bad token).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found (administrative lookups only).
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Argon2 parameters rejected at startup.
    #[error("invalid password hashing parameters: {0}")]
    HashingParams(String),
}
