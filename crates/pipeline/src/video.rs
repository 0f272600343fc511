//! Single-frame video analysis.
//!
//! Uploaded clips are sampled at their midpoint: one representative frame is
//! extracted with ffmpeg and run through the detector. Whole-clip scanning is
//! deliberately out of scope for the upload path.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;
use serde::Deserialize;
use tracing::debug;

use agrivision_core::detection::Detection;
use agrivision_detector::{preprocess, ObjectDetector};

use crate::error::PipelineError;

/// Result of analyzing one uploaded clip.
#[derive(Debug, Clone)]
pub struct VideoAnalysis {
    pub duration_secs: f64,
    /// Timestamp of the sampled frame.
    pub frame_timestamp_secs: f64,
    pub detections: Vec<Detection>,
    pub annotated: RgbImage,
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

fn parse_duration(probe: &FfprobeOutput) -> Option<f64> {
    // Format-level duration first, then the first video stream's.
    if let Some(secs) = probe.format.duration.as_deref().and_then(|d| d.parse().ok()) {
        return Some(secs);
    }
    probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| s.duration.as_deref())
        .and_then(|d| d.parse().ok())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run `ffprobe` on a video file and return its duration in seconds.
pub async fn probe_duration(path: &Path) -> Result<f64, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::VideoNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(PipelineError::ToolNotFound)?;

    if !output.status.success() {
        return Err(PipelineError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let probe: FfprobeOutput = serde_json::from_str(&stdout)
        .map_err(|e| PipelineError::ParseError(format!("{e}: {stdout}")))?;

    match parse_duration(&probe) {
        Some(secs) if secs > 0.0 => Ok(secs),
        _ => Err(PipelineError::EmptyVideo),
    }
}

/// Timestamp of the representative frame for a clip of the given duration.
pub fn middle_timestamp(duration_secs: f64) -> f64 {
    duration_secs / 2.0
}

/// Extract one frame at `timestamp_secs` as PNG bytes, via ffmpeg's stdout.
pub async fn extract_frame_png(
    path: &Path,
    timestamp_secs: f64,
) -> Result<Vec<u8>, PipelineError> {
    let output = tokio::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{timestamp_secs:.3}"), "-i"])
        .arg(path)
        .args(["-frames:v", "1", "-f", "image2", "-c:v", "png", "pipe:1"])
        .output()
        .await
        .map_err(PipelineError::ToolNotFound)?;

    if !output.status.success() || output.stdout.is_empty() {
        return Err(PipelineError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    Ok(output.stdout)
}

/// Probe the clip, pull its middle frame, and run detection on it.
///
/// Inference runs on a blocking thread so the async runtime is never stalled
/// by model execution.
pub async fn analyze_video(
    detector: Arc<dyn ObjectDetector>,
    path: &Path,
    confidence_threshold: f32,
) -> Result<VideoAnalysis, PipelineError> {
    let duration_secs = probe_duration(path).await?;
    let frame_timestamp_secs = middle_timestamp(duration_secs);
    debug!(
        duration_secs,
        frame_timestamp_secs, "sampling middle frame of uploaded clip"
    );

    let frame_bytes = extract_frame_png(path, frame_timestamp_secs).await?;

    let output = tokio::task::spawn_blocking(move || {
        let frame = preprocess::decode_image(&frame_bytes)?;
        detector.detect(&frame, confidence_threshold)
    })
    .await
    .map_err(|_| PipelineError::TaskFailed)??;

    Ok(VideoAnalysis {
        duration_secs,
        frame_timestamp_secs,
        detections: output.detections,
        annotated: output.annotated,
    })
}
