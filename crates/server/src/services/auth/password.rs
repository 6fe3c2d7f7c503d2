//! Password hashing and verification with Argon2id.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;

use super::AuthError;
use crate::models::token::generate_token_value;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes new passwords and verifies presented ones.
///
/// Verification goes through argon2's [`PasswordVerifier`], which compares
/// digests in constant time. Stored hashes carry their own parameters, so
/// changing [`HashingParams`] only affects newly hashed passwords.
pub struct Passwords {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl Passwords {
    /// Build a hasher with the given cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::HashingParams` if argon2 rejects the parameters.
    pub fn new(params: HashingParams) -> Result<Self, AuthError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| AuthError::HashingParams(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, generate_token_value().expose_secret())?;

        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash_with(&self.argon2, password)
    }

    /// Check a password against a stored PHC hash string.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spend the same work as a real verification when there is no hash to check.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Validate a password against the minimum length.
///
/// Length is counted in characters, not bytes.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str, min_length: usize) -> Result<(), AuthError> {
    if password.chars().count() < min_length {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {min_length} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Cheapest parameters argon2 accepts; keeps tests fast.
    fn fast() -> Passwords {
        Passwords::new(HashingParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let passwords = fast();
        let hash = passwords.hash("Testpass123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Testpass123"));
        assert!(passwords.verify("Testpass123", &hash));
        assert!(!passwords.verify("testpass123", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let passwords = fast();
        let a = passwords.hash("same").unwrap();
        let b = passwords.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!fast().verify("password", "not-a-phc-string"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = Passwords::new(HashingParams {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(AuthError::HashingParams(_))));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("pos", 6).is_err());
        assert!(validate_password("12345", 6).is_err());
        assert!(validate_password("123456", 6).is_ok());
        assert!(validate_password("testpas123", 6).is_ok());
        // Multi-byte characters count once each
        assert!(validate_password("ééééé", 6).is_err());
    }
}
