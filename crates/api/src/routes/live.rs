//! Route definitions for the `/live` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::live;
use crate::state::AppState;

/// Routes mounted at `/live`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(live::start))
        .route("/stop", post(live::stop))
}
