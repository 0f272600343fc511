//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use agrivision_core::types::{format_display_timestamp, DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserProfile`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub last_login_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

/// Safe user representation for API responses (no password hash),
/// timestamps formatted for display.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub last_login: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: format_display_timestamp(user.created_at),
            last_login: user.last_login_at.map(format_display_timestamp),
            updated_at: user.updated_at.map(format_display_timestamp),
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// DTO for a profile update. All fields optional; at least one must be set,
/// which the caller validates before reaching the repository.
#[derive(Debug, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}
