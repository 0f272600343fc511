//! Route definitions for the `/auth` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST  /register -> register
/// POST  /login    -> login
/// POST  /logout   -> logout (requires auth)
/// GET   /info     -> profile (requires auth)
/// PATCH /update   -> profile update (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/info", get(auth::info))
        .route("/update", patch(auth::update))
}
