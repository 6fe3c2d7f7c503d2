//! Bearer token domain type.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use recipe_accounts_core::TokenDigest;

use super::User;

/// Number of random bytes in a token (hex encoded to 40 characters).
pub const TOKEN_BYTES: usize = 20;

/// A freshly issued bearer token and its owner.
///
/// The plaintext value only exists here, between issuance and the response;
/// stores keep the [`TokenDigest`].
pub struct Token {
    value: SecretString,
    /// The user the token authenticates.
    pub owner: User,
}

impl Token {
    /// Wrap a generated token value.
    #[must_use]
    pub const fn new(value: SecretString, owner: User) -> Self {
        Self { value, owner }
    }

    /// The plaintext token value.
    #[must_use]
    pub const fn value(&self) -> &SecretString {
        &self.value
    }

    /// Digest used to persist and look up this token.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        digest_token(self.value.expose_secret())
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[REDACTED]")
            .field("owner", &self.owner.id)
            .finish()
    }
}

/// Generate a new random token value from the thread-local CSPRNG.
#[must_use]
pub fn generate_token_value() -> SecretString {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    SecretString::from(hex::encode(bytes))
}

/// SHA-256 digest of a presented token value.
#[must_use]
pub fn digest_token(value: &str) -> TokenDigest {
    TokenDigest::from_sha256(Sha256::digest(value.as_bytes()).into())
}
