//! Authentication service.
//!
//! Two collaborating pieces:
//!
//! - [`UserDirectory`] owns account records: creation with email
//!   normalization and Argon2 hashing, credential checks, profile changes.
//! - [`TokenIssuer`] turns valid credentials into an opaque bearer token and
//!   resolves presented tokens back to their owner.

mod error;
mod password;

pub use error::AuthError;
pub use password::{HashingParams, Passwords, validate_password};

use std::sync::Arc;

use recipe_accounts_core::{AccountKind, Email, UserId};

use crate::db::{RepositoryError, UserStore};
use crate::models::token::{Token, digest_token, generate_token_value};
use crate::models::{NewUser, User};

/// Account records and credential checks.
///
/// Cheap to clone; clones share the same store and hasher.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    passwords: Arc<Passwords>,
}

impl UserDirectory {
    /// Create a directory over a store.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, passwords: Arc<Passwords>) -> Self {
        Self { store, passwords }
    }

    // =========================================================================
    // Account Creation
    // =========================================================================

    /// Create a regular user.
    ///
    /// The email is lower-cased before storage and the password is stored only
    /// as an Argon2id hash. Password strength is not checked here; see
    /// [`validate_password`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if no email is given.
    /// Returns `AuthError::InvalidEmail` if the email is empty or malformed.
    /// Returns `AuthError::UserAlreadyExists` if the normalized email is taken.
    pub async fn create_user(
        &self,
        email: Option<&str>,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, AuthError> {
        self.create(email, password, name, AccountKind::Regular)
            .await
    }

    /// Create a superuser (`is_staff` and `is_superuser` both set).
    ///
    /// # Errors
    ///
    /// Same as [`UserDirectory::create_user`].
    pub async fn create_superuser(
        &self,
        email: Option<&str>,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, AuthError> {
        self.create(email, password, name, AccountKind::Superuser)
            .await
    }

    async fn create(
        &self,
        email: Option<&str>,
        password: &str,
        name: Option<&str>,
        kind: AccountKind,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email.ok_or(AuthError::MissingField("email"))?)?;
        let password_hash = self.passwords.hash(password)?;

        let new_user = NewUser {
            email,
            password_hash,
            name: name.map(str::to_owned),
            kind,
        };

        let user = self
            .store
            .insert_user(&new_user)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, kind = %kind, "user created");
        Ok(user)
    }

    // =========================================================================
    // Credential Checks
    // =========================================================================

    /// Check an email/password pair.
    ///
    /// Returns the user on a match and `None` otherwise: unknown or malformed
    /// email, wrong password, or inactive account. The caller cannot tell
    /// these apart, and an unknown email costs one hash verification like a
    /// known one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let Ok(email) = Email::parse(email) else {
            self.passwords.verify_dummy(password);
            tracing::debug!(reason = "malformed_email", "credential check failed");
            return Ok(None);
        };

        let Some((user, password_hash)) = self.store.get_password_hash(&email).await? else {
            self.passwords.verify_dummy(password);
            tracing::debug!(reason = "unknown_email", "credential check failed");
            return Ok(None);
        };

        if !self.passwords.verify(password, &password_hash) {
            tracing::debug!(user_id = %user.id, reason = "wrong_password", "credential check failed");
            return Ok(None);
        }

        if !user.is_active {
            tracing::debug!(user_id = %user.id, reason = "inactive", "credential check failed");
            return Ok(None);
        }

        Ok(Some(user))
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.store
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Replace a user's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn change_password(
        &self,
        user_id: UserId,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let password_hash = self.passwords.hash(new_password)?;

        self.store
            .set_password_hash(user_id, &password_hash)
            .await
            .map_err(not_found_as_user_not_found)?;

        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }

    /// Replace a user's display name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn update_name(
        &self,
        user_id: UserId,
        name: Option<&str>,
    ) -> Result<User, AuthError> {
        self.store
            .set_name(user_id, name)
            .await
            .map_err(not_found_as_user_not_found)
    }

    /// Deactivate the account with this email. Inactive accounts can no
    /// longer log in or use previously issued tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed.
    /// Returns `AuthError::UserNotFound` if no account uses the email.
    pub async fn deactivate(&self, email: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let mut user = self
            .store
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.store
            .set_active(user.id, false)
            .await
            .map_err(not_found_as_user_not_found)?;
        user.is_active = false;

        tracing::info!(user_id = %user.id, "user deactivated");
        Ok(user)
    }
}

fn not_found_as_user_not_found(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::NotFound => AuthError::UserNotFound,
        other => AuthError::Repository(other),
    }
}

/// Issues and resolves bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    directory: UserDirectory,
}

impl TokenIssuer {
    /// Create a token issuer backed by a user directory.
    #[must_use]
    pub const fn new(directory: UserDirectory) -> Self {
        Self { directory }
    }

    /// Exchange credentials for a new token.
    ///
    /// Any previous token of the user stops working. Every failure (missing
    /// field, unknown email, wrong password, inactive account) is the same
    /// `AuthError::InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the credentials don't match.
    /// Returns `AuthError::Repository` if the store fails.
    pub async fn issue_token(&self, email: &str, password: &str) -> Result<Token, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .directory
            .verify_credentials(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = Token::new(generate_token_value(), user);
        self.directory
            .store
            .replace_token(token.owner.id, &token.digest())
            .await?;

        tracing::info!(user_id = %token.owner.id, "token issued");
        Ok(token)
    }

    /// Resolve a presented token to its (active) owner.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the token is unknown or its
    /// owner is inactive.
    pub async fn authenticate(&self, presented: &str) -> Result<User, AuthError> {
        if presented.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let digest = digest_token(presented);
        let user = self
            .directory
            .store
            .get_by_token(&digest)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(user)
    }

    /// The directory this issuer verifies against.
    #[must_use]
    pub const fn directory(&self) -> &UserDirectory {
        &self.directory
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::db::MemoryUserStore;

    fn directory() -> UserDirectory {
        let passwords = Passwords::new(HashingParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        UserDirectory::new(Arc::new(MemoryUserStore::new()), Arc::new(passwords))
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(directory())
    }

    // =========================================================================
    // User Directory
    // =========================================================================

    #[tokio::test]
    async fn test_create_user_with_email_successful() {
        let directory = directory();
        let user = directory
            .create_user(Some("test@algo.com"), "Testpass123", Some("testname"))
            .await
            .unwrap();

        assert_eq!(user.email.as_str(), "test@algo.com");
        assert_eq!(user.name.as_deref(), Some("testname"));
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(!user.is_superuser);

        let verified = directory
            .verify_credentials("test@algo.com", "Testpass123")
            .await
            .unwrap();
        assert_eq!(verified.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_new_user_email_normalized() {
        let directory = directory();
        let user = directory
            .create_user(Some("test@ALGO.COM"), "Testpass123", Some("Other"))
            .await
            .unwrap();

        assert_eq!(user.email.as_str(), "test@algo.com");
        assert!(
            directory
                .verify_credentials("test@algo.com", "Testpass123")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_lookup_with_any_case_variant() {
        let directory = directory();
        let user = directory
            .create_user(Some("Mixed@Case.com"), "secret1", None)
            .await
            .unwrap();

        for variant in ["mixed@case.com", "MIXED@CASE.COM", "mIxEd@cAsE.cOm"] {
            let found = directory
                .verify_credentials(variant, "secret1")
                .await
                .unwrap()
                .unwrap();
            assert_eq!(found.id, user.id);
        }
    }

    #[tokio::test]
    async fn test_new_user_without_email_fails() {
        let err = directory()
            .create_user(None, "test1234", Some("algo"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingField("email")));
    }

    #[tokio::test]
    async fn test_new_user_empty_email_fails() {
        let err = directory()
            .create_user(Some(""), "test1234", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_differing_by_case_conflicts() {
        let directory = directory();
        directory
            .create_user(Some("dup@example.com"), "password1", None)
            .await
            .unwrap();

        let err = directory
            .create_user(Some("DUP@Example.com"), "password2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_create_user_does_not_enforce_length() {
        // Length is a web-layer rule; the directory accepts short passwords.
        let directory = directory();
        assert!(
            directory
                .create_user(Some("short@example.com"), "test", None)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_create_new_superuser() {
        let user = directory()
            .create_superuser(Some("algo@algo.com"), "tests123", None)
            .await
            .unwrap();

        assert!(user.is_superuser);
        assert!(user.is_staff);
        assert_eq!(user.name, None);
    }

    #[tokio::test]
    async fn test_create_superuser_with_name() {
        let directory = directory();
        let user = directory
            .create_superuser(Some("Admin@Example.com"), "tests123", Some("Admin"))
            .await
            .unwrap();

        assert_eq!(user.name.as_deref(), Some("Admin"));
        assert!(user.is_superuser);

        let stored = directory.get_user(user.id).await.unwrap();
        assert_eq!(stored, user);
    }

    #[tokio::test]
    async fn test_verify_credentials_rejections() {
        let directory = directory();
        directory
            .create_user(Some("user@example.com"), "correct-horse", None)
            .await
            .unwrap();

        for (email, password) in [
            ("user@example.com", "wrong"),
            ("nobody@example.com", "correct-horse"),
            ("not-an-email", "correct-horse"),
            ("", ""),
        ] {
            assert!(
                directory
                    .verify_credentials(email, password)
                    .await
                    .unwrap()
                    .is_none(),
                "{email}/{password} should not verify"
            );
        }
    }

    #[tokio::test]
    async fn test_change_password() {
        let directory = directory();
        let user = directory
            .create_user(Some("user@example.com"), "old-password", None)
            .await
            .unwrap();

        directory
            .change_password(user.id, "new-password")
            .await
            .unwrap();

        let old = directory
            .verify_credentials("user@example.com", "old-password")
            .await
            .unwrap();
        let new = directory
            .verify_credentials("user@example.com", "new-password")
            .await
            .unwrap();
        assert!(old.is_none());
        assert!(new.is_some());
    }

    #[tokio::test]
    async fn test_update_name_and_missing_user() {
        let directory = directory();
        let user = directory
            .create_user(Some("user@example.com"), "password", Some("Before"))
            .await
            .unwrap();

        let updated = directory
            .update_name(user.id, Some("After"))
            .await
            .unwrap();
        assert_eq!(updated.name.as_deref(), Some("After"));

        let err = directory
            .update_name(UserId::new(999), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_deactivated_user_cannot_verify() {
        let directory = directory();
        directory
            .create_user(Some("gone@example.com"), "password", None)
            .await
            .unwrap();

        let user = directory.deactivate("GONE@example.com").await.unwrap();
        assert!(!user.is_active);

        assert!(
            directory
                .verify_credentials("gone@example.com", "password")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_get_user() {
        let directory = directory();
        let user = directory
            .create_user(Some("found@example.com"), "password", None)
            .await
            .unwrap();

        assert_eq!(directory.get_user(user.id).await.unwrap(), user);
        assert!(matches!(
            directory.get_user(UserId::new(999)).await,
            Err(AuthError::UserNotFound)
        ));
    }

    // =========================================================================
    // Token Issuer
    // =========================================================================

    #[tokio::test]
    async fn test_issue_token_for_valid_credentials() {
        let issuer = issuer();
        let user = issuer
            .directory()
            .create_user(Some("test@test.com"), "test", None)
            .await
            .unwrap();

        let token = issuer.issue_token("test@test.com", "test").await.unwrap();
        assert!(!token.value().expose_secret().is_empty());
        assert_eq!(token.owner.id, user.id);

        let owner = issuer
            .authenticate(token.value().expose_secret())
            .await
            .unwrap();
        assert_eq!(owner.id, user.id);
    }

    #[tokio::test]
    async fn test_issue_token_for_unregistered_user_fails() {
        let err = issuer()
            .issue_token("test@test.com", "testpas123")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_issue_token_failures_are_indistinguishable() {
        let issuer = issuer();
        issuer
            .directory()
            .create_user(Some("test@londonappdev.com"), "testpass", None)
            .await
            .unwrap();

        let wrong_password = issuer
            .issue_token("test@londonappdev.com", "nope")
            .await
            .unwrap_err();
        let unknown_user = issuer
            .issue_token("test@test1.com", "testpass")
            .await
            .unwrap_err();
        let missing = issuer.issue_token("al", "").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(unknown_user.to_string(), missing.to_string());
        assert!(matches!(missing, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_reissue_replaces_previous_token() {
        let issuer = issuer();
        issuer
            .directory()
            .create_user(Some("user@example.com"), "password", None)
            .await
            .unwrap();

        let first = issuer
            .issue_token("user@example.com", "password")
            .await
            .unwrap();
        let second = issuer
            .issue_token("USER@example.com", "password")
            .await
            .unwrap();

        assert_ne!(
            first.value().expose_secret(),
            second.value().expose_secret()
        );
        assert!(
            issuer
                .authenticate(first.value().expose_secret())
                .await
                .is_err()
        );
        assert!(
            issuer
                .authenticate(second.value().expose_secret())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_token_of_deactivated_user_rejected() {
        let issuer = issuer();
        issuer
            .directory()
            .create_user(Some("user@example.com"), "password", None)
            .await
            .unwrap();
        let token = issuer
            .issue_token("user@example.com", "password")
            .await
            .unwrap();

        issuer
            .directory()
            .deactivate("user@example.com")
            .await
            .unwrap();

        let err = issuer
            .authenticate(token.value().expose_secret())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let err = issuer().authenticate("deadbeef").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
