//! Handlers for the `/live` resource (webcam capture sessions).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agrivision_core::detection::{ClassCounts, DetectionSource};
use agrivision_pipeline::{FfmpegCaptureSource, LiveConfig, LiveSession};

use crate::error::{AppError, AppResult};
use crate::handlers::predict::log_event;
use crate::live::RunningLive;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const DEFAULT_CONFIDENCE: f32 = 0.5;
const DEFAULT_DEVICE: &str = "/dev/video0";
const CAPTURE_WIDTH: u32 = 640;
const CAPTURE_HEIGHT: u32 = 480;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /live/start`.
#[derive(Debug, Default, Deserialize)]
pub struct StartLiveRequest {
    pub conf: Option<f32>,
    pub device: Option<String>,
}

/// Response for `POST /live/start`.
#[derive(Debug, Serialize)]
pub struct StartLiveResponse {
    pub message: String,
    pub session_id: Uuid,
}

/// Response for `POST /live/stop`: the aggregate over every inferred frame.
#[derive(Debug, Serialize)]
pub struct StopLiveResponse {
    pub message: String,
    pub session_id: Uuid,
    pub class_counts: ClassCounts,
    pub total: u32,
    pub frames_processed: u64,
    pub frames_dropped: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/live/start
///
/// Open the camera and start the capture/inference loop. One session per
/// user; a second start is a conflict.
pub async fn start(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<StartLiveRequest>>,
) -> AppResult<Json<StartLiveResponse>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let conf = input.conf.unwrap_or(DEFAULT_CONFIDENCE);
    if !(conf > 0.0 && conf <= 1.0) {
        return Err(AppError::BadRequest("conf must be in (0, 1]".to_string()));
    }
    let device = input.device.unwrap_or_else(|| DEFAULT_DEVICE.to_string());

    if state.live.is_running(&auth.username).await {
        return Err(AppError::Conflict(
            "A live session is already running".to_string(),
        ));
    }

    let source = FfmpegCaptureSource::open(&device, CAPTURE_WIDTH, CAPTURE_HEIGHT)?;
    let session = LiveSession::spawn(
        Box::new(source),
        state.detector.clone(),
        LiveConfig::new(conf),
    );

    let id = Uuid::new_v4();
    let running = RunningLive { id, conf, session };
    if let Err(running) = state.live.insert(&auth.username, running).await {
        // Lost the race with a concurrent start; tear this one down.
        let _ = running.session.stop().await;
        return Err(AppError::Conflict(
            "A live session is already running".to_string(),
        ));
    }

    tracing::info!(username = %auth.username, session_id = %id, %device, "live session started");
    Ok(Json(StartLiveResponse {
        message: "Live detection started".to_string(),
        session_id: id,
    }))
}

/// POST /api/v1/live/stop
///
/// Stop the running session and return the aggregated counts. The `webcam`
/// history append is best-effort.
pub async fn stop(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<StopLiveResponse>> {
    let running = state
        .live
        .take(&auth.username)
        .await
        .ok_or_else(|| AppError::NotFound("No live session is running".to_string()))?;

    let summary = running.session.stop().await?;

    log_event(
        &state,
        &auth.username,
        DetectionSource::Webcam,
        running.conf,
        &summary.class_counts,
        &[],
        None,
    )
    .await;

    tracing::info!(
        username = %auth.username,
        session_id = %running.id,
        frames = summary.frames_processed,
        "live session stopped"
    );
    Ok(Json(StopLiveResponse {
        message: "Live detection stopped".to_string(),
        session_id: running.id,
        total: summary.class_counts.total(),
        class_counts: summary.class_counts,
        frames_processed: summary.frames_processed,
        frames_dropped: summary.frames_dropped,
    }))
}
