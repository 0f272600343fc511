//! Route definitions for the predict endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::predict;
use crate::state::AppState;

/// Routes mounted directly under `/api/v1`.
///
/// ```text
/// POST /predict        -> image detection
/// POST /predict/video  -> middle-frame video detection
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict::predict))
        .route("/predict/video", post(predict::predict_video))
}
