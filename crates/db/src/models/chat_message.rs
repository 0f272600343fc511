//! Chat log model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use agrivision_core::types::{DbId, Timestamp};

/// One user/assistant exchange.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatMessage {
    pub id: DbId,
    pub username: String,
    pub created_at: Timestamp,
    pub user_message: String,
    pub assistant_reply: String,
    pub model: String,
}

/// DTO for appending a chat exchange.
#[derive(Debug)]
pub struct CreateChatMessage {
    pub username: String,
    pub user_message: String,
    pub assistant_reply: String,
    pub model: String,
}
