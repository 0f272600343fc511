//! Route definitions for the `/chat` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(chat::send))
        .route("/history", get(chat::history).delete(chat::clear))
}
