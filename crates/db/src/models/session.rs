//! Session entity model and DTOs.

use sqlx::FromRow;

use agrivision_core::types::{DbId, Timestamp};

/// A login session. Only the SHA-256 digest of the opaque token is stored,
/// so a database leak does not compromise active sessions.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

/// DTO for creating a new session at login.
#[derive(Debug)]
pub struct CreateSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
