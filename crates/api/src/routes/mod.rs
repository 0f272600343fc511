pub mod auth;
pub mod chat;
pub mod health;
pub mod history;
pub mod live;
pub mod predict;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register        register (public)
/// /auth/login           login (public)
/// /auth/logout          logout (requires auth)
/// /auth/info            profile (requires auth)
/// /auth/update          profile update (requires auth)
///
/// /predict              image detection (requires auth)
/// /predict/video        middle-frame video detection (requires auth)
///
/// /live/start           start webcam session (requires auth)
/// /live/stop            stop webcam session (requires auth)
///
/// /history              detection events, newest first (requires auth)
/// /history/latest       most recent event (requires auth)
/// /history/count        event count (requires auth)
/// /history/summary      narrative analysis (requires auth)
///
/// /chat                 assistant turn (requires auth)
/// /chat/history         conversation history (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(predict::router())
        .nest("/live", live::router())
        .nest("/history", history::router())
        .nest("/chat", chat::router())
}
