//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use recipe_accounts_core::{AccountKind, Email, UserId};

/// An account holder (domain type).
///
/// Carries no password hash; stores hand the hash out separately through
/// `UserStore::get_password_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized (lower-cased) email address.
    pub email: Email,
    /// Optional display name.
    pub name: Option<String>,
    /// Staff flag.
    pub is_staff: bool,
    /// Superuser flag.
    pub is_superuser: bool,
    /// Inactive users cannot authenticate.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user about to be inserted into a store.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Normalized email address.
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Regular or superuser.
    pub kind: AccountKind,
}
