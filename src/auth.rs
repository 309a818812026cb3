//! Password Gate
//!
//! The server hashes its configured password once at startup. Each client's
//! handshake password is hashed the same way and the two hex digests are
//! compared.

use sha2::{Digest, Sha256};

/// Returns the lowercase hex SHA-256 digest of `bytes`.
///
/// # Example
///
/// ```
/// use datastacks::auth::digest;
///
/// assert_eq!(
///     digest(b"abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Verifies client passwords against the server-wide digest.
#[derive(Debug, Clone)]
pub struct AuthGate {
    password_digest: String,
}

impl AuthGate {
    /// Creates a gate for the configured password.
    pub fn new(password: &str) -> Self {
        Self {
            password_digest: digest(password.as_bytes()),
        }
    }

    /// Returns true if `candidate` hashes to the configured digest.
    pub fn verify(&self, candidate: &str) -> bool {
        digest(candidate.as_bytes()) == self.password_digest
    }
}
