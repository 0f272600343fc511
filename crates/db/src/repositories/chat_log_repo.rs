//! Repository for the `chat_messages` table.

use sqlx::PgPool;

use crate::models::chat_message::{ChatMessage, CreateChatMessage};

const COLUMNS: &str = "id, username, created_at, user_message, assistant_reply, model";

/// Provides append/query operations for chat history.
pub struct ChatLogRepo;

impl ChatLogRepo {
    /// Append one chat exchange, returning the created row.
    pub async fn append(
        pool: &PgPool,
        input: &CreateChatMessage,
    ) -> Result<ChatMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO chat_messages (username, user_message, assistant_reply, model)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChatMessage>(&query)
            .bind(&input.username)
            .bind(&input.user_message)
            .bind(&input.assistant_reply)
            .bind(&input.model)
            .fetch_one(pool)
            .await
    }

    /// A user's most recent exchanges, returned oldest-first so a client can
    /// replay them in conversation order.
    pub async fn recent_by_user(
        pool: &PgPool,
        username: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let query = format!(
            "SELECT * FROM (
                SELECT {COLUMNS} FROM chat_messages
                WHERE username = $1
                ORDER BY created_at DESC
                LIMIT $2
             ) recent ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ChatMessage>(&query)
            .bind(username)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Remove all chat history for a user. Returns the number of rows deleted.
    pub async fn delete_by_user(pool: &PgPool, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
