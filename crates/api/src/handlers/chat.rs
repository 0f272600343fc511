//! Handlers for the `/chat` resource (assistant conversation).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use agrivision_db::models::chat_message::{ChatMessage, CreateChatMessage};
use agrivision_db::repositories::ChatLogRepo;
use agrivision_narrator::{prompt, DEFAULT_MODEL};

use crate::error::{AppError, AppResult};
use crate::handlers::history::LimitQuery;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/v1/chat
///
/// One assistant turn. The reply (or the inline failure text) is persisted
/// to chat history best-effort.
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let message = input.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }

    let (reply, model) = match &state.narrator {
        None => (
            "The assistant is unavailable: no narrator API key is configured.".to_string(),
            DEFAULT_MODEL.to_string(),
        ),
        Some(narrator) => {
            let model = narrator.model().to_string();
            match narrator.generate(&prompt::chat_turn(message)).await {
                Ok(text) => (text, model),
                Err(e) => {
                    tracing::warn!(error = %e, "chat reply failed");
                    (format!("Could not reach the assistant: {e}"), model)
                }
            }
        }
    };

    let record = CreateChatMessage {
        username: auth.username.clone(),
        user_message: message.to_string(),
        assistant_reply: reply.clone(),
        model,
    };
    if let Err(e) = ChatLogRepo::append(&state.pool, &record).await {
        tracing::warn!(error = %e, "failed to append chat message");
    }

    Ok(Json(ChatResponse { reply }))
}

/// GET /api/v1/chat/history?limit=
///
/// The user's recent exchanges in conversation order (oldest first).
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    let messages =
        ChatLogRepo::recent_by_user(&state.pool, &auth.username, query.capped()).await?;
    Ok(Json(messages))
}

/// DELETE /api/v1/chat/history
///
/// Clear the user's chat history. Returns 204 No Content.
pub async fn clear(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    ChatLogRepo::delete_by_user(&state.pool, &auth.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
