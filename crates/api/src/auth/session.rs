//! Opaque session tokens.
//!
//! A session token is a random UUID handed to the client exactly once at
//! login. Only its SHA-256 hex digest is stored, so a leaked sessions table
//! cannot be replayed.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a new session token.
///
/// Returns `(plaintext, hash)`: the plaintext goes to the client, the hash
/// goes in the `sessions` table.
pub fn generate_session_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_session_token(&plaintext);
    (plaintext, hash)
}

/// Compute the SHA-256 hex digest of a session token.
///
/// Use this to compare an incoming token against the stored hash.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
