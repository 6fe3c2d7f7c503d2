//! Bearer token digest type.
//!
//! Issued tokens are never stored in plaintext. The server keeps the SHA-256
//! digest of each token and looks tokens up by digest.

use core::fmt;

/// Lowercase hex SHA-256 digest of a bearer token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Length of a hex-encoded SHA-256 digest.
    pub const HEX_LENGTH: usize = 64;

    /// Build a digest from raw SHA-256 output.
    #[must_use]
    pub fn from_sha256(bytes: [u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Returns the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Digests are shortened in debug output; they identify a live credential.
impl fmt::Debug for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..8).unwrap_or(&self.0);
        write!(f, "TokenDigest({prefix}…)")
    }
}

impl AsRef<str> for TokenDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
