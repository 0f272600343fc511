//! Handlers for `/predict` (image) and `/predict/video`.

use std::io::Cursor;

use axum::extract::{Multipart, Query, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agrivision_core::detection::{ClassCounts, Detection, DetectionSource};
use agrivision_db::models::detection_event::CreateDetectionEvent;
use agrivision_db::repositories::DetectionLogRepo;
use agrivision_detector::preprocess::decode_image;
use agrivision_pipeline::analyze_video;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Confidence threshold used when the request does not specify one.
const DEFAULT_CONFIDENCE: f32 = 0.5;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string for both predict endpoints.
#[derive(Debug, Deserialize)]
pub struct ConfQuery {
    pub conf: Option<f32>,
}

impl ConfQuery {
    /// Resolve the effective threshold, rejecting values outside (0, 1].
    fn threshold(&self) -> Result<f32, AppError> {
        let conf = self.conf.unwrap_or(DEFAULT_CONFIDENCE);
        if !(conf > 0.0 && conf <= 1.0) {
            return Err(AppError::BadRequest(
                "conf must be in (0, 1]".to_string(),
            ));
        }
        Ok(conf)
    }
}

/// Response for `POST /predict`.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub detections: Vec<Detection>,
    pub class_counts: ClassCounts,
    pub total: u32,
    /// The uploaded image with boxes drawn, as base64 JPEG.
    pub annotated_image: String,
    pub file_name: Option<String>,
}

/// Response for `POST /predict/video`.
#[derive(Debug, Serialize)]
pub struct PredictVideoResponse {
    pub detections: Vec<Detection>,
    pub class_counts: ClassCounts,
    pub total: u32,
    /// The sampled middle frame with boxes drawn, as base64 JPEG.
    pub annotated_frame: String,
    pub file_name: Option<String>,
    pub duration_secs: f64,
    pub frame_timestamp_secs: f64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/predict?conf=
///
/// Run detection on one uploaded image. The history append is best-effort:
/// a log failure is warned about, never surfaced.
pub async fn predict(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ConfQuery>,
    multipart: Multipart,
) -> AppResult<Json<PredictResponse>> {
    let threshold = query.threshold()?;
    let (bytes, file_name) = read_file_field(multipart).await?;

    let detector = state.detector.clone();
    let output = tokio::task::spawn_blocking(move || {
        let img = decode_image(&bytes)?;
        detector.detect(&img, threshold)
    })
    .await
    .map_err(|_| AppError::InternalError("inference task failed".to_string()))??;

    let class_counts: ClassCounts = output.detections.iter().collect();
    let annotated_image = encode_jpeg_base64(&output.annotated)?;

    log_event(
        &state,
        &auth.username,
        DetectionSource::Image,
        threshold,
        &class_counts,
        &output.detections,
        file_name.clone(),
    )
    .await;

    Ok(Json(PredictResponse {
        total: class_counts.total(),
        detections: output.detections,
        class_counts,
        annotated_image,
        file_name,
    }))
}

/// POST /api/v1/predict/video?conf=
///
/// Probe the uploaded clip, sample its middle frame, run detection on it.
pub async fn predict_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ConfQuery>,
    multipart: Multipart,
) -> AppResult<Json<PredictVideoResponse>> {
    let threshold = query.threshold()?;
    let (bytes, file_name) = read_file_field(multipart).await?;

    // ffmpeg wants a file on disk; the upload is staged in the temp dir and
    // removed again whatever the outcome.
    let temp_path = std::env::temp_dir().join(format!("agrivision-upload-{}", Uuid::new_v4()));
    tokio::fs::write(&temp_path, &bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("could not stage upload: {e}")))?;

    let analysis = analyze_video(state.detector.clone(), &temp_path, threshold).await;
    let _ = tokio::fs::remove_file(&temp_path).await;
    let analysis = analysis?;

    let class_counts: ClassCounts = analysis.detections.iter().collect();
    let annotated_frame = encode_jpeg_base64(&analysis.annotated)?;

    log_event(
        &state,
        &auth.username,
        DetectionSource::Video,
        threshold,
        &class_counts,
        &analysis.detections,
        file_name.clone(),
    )
    .await;

    Ok(Json(PredictVideoResponse {
        total: class_counts.total(),
        detections: analysis.detections,
        class_counts,
        annotated_frame,
        file_name,
        duration_secs: analysis.duration_secs,
        frame_timestamp_secs: analysis.frame_timestamp_secs,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Pull the `file` part out of a multipart upload.
async fn read_file_field(mut multipart: Multipart) -> Result<(Vec<u8>, Option<String>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Could not read upload: {e}")))?;
            if bytes.is_empty() {
                return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
            }
            return Ok((bytes.to_vec(), file_name));
        }
    }
    Err(AppError::BadRequest(
        "Missing multipart field 'file'".to_string(),
    ))
}

/// Encode an annotated frame as base64 JPEG for the response body.
fn encode_jpeg_base64(image: &RgbImage) -> Result<String, AppError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| AppError::InternalError(format!("could not encode annotated image: {e}")))?;
    Ok(BASE64.encode(buf.into_inner()))
}

/// Append one detection event, degrading failures to a warning.
pub(crate) async fn log_event(
    state: &AppState,
    username: &str,
    source: DetectionSource,
    confidence_threshold: f32,
    class_counts: &ClassCounts,
    detections: &[Detection],
    file_name: Option<String>,
) {
    let event = CreateDetectionEvent {
        username: username.to_string(),
        source,
        confidence_threshold,
        class_counts: class_counts.clone(),
        raw_detections: detections.to_vec(),
        file_name,
    };
    if let Err(e) = DetectionLogRepo::append(&state.pool, &event).await {
        tracing::warn!(error = %e, %source, "failed to append detection event");
    }
}
