//! Handlers for the `/history` resource (detection log queries).

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use agrivision_db::models::detection_event::DetectionEvent;
use agrivision_db::repositories::DetectionLogRepo;
use agrivision_narrator::prompt;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub(crate) fn capped(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// GET /api/v1/history?limit=
///
/// The user's detection events, newest first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<DetectionEvent>>> {
    let events = DetectionLogRepo::list_by_user(&state.pool, &auth.username, query.capped()).await?;
    Ok(Json(events))
}

/// GET /api/v1/history/latest
///
/// The most recent event, or `null` when the user has none.
pub async fn latest(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Option<DetectionEvent>>> {
    let event = DetectionLogRepo::latest_by_user(&state.pool, &auth.username).await?;
    Ok(Json(event))
}

/// GET /api/v1/history/count
pub async fn count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<CountResponse>> {
    let count = DetectionLogRepo::count_by_user(&state.pool, &auth.username).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/history/summary
///
/// Narrative paragraph over the most recent detection run. Narrator failures
/// surface inline as the summary text, never as an error status.
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<SummaryResponse>> {
    let Some(event) = DetectionLogRepo::latest_by_user(&state.pool, &auth.username).await? else {
        return Ok(Json(SummaryResponse {
            summary: "No detection runs recorded yet.".to_string(),
        }));
    };

    let text = match &state.narrator {
        None => "Analysis is unavailable: no narrator API key is configured.".to_string(),
        Some(narrator) => {
            let prompt = prompt::harvest_summary(&event.class_counts.0, event.total as u32);
            match narrator.generate(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "narrator summary failed");
                    format!("Could not generate the analysis: {e}")
                }
            }
        }
    };

    Ok(Json(SummaryResponse { summary: text }))
}
