//! Pipeline error taxonomy.

use agrivision_detector::DetectorError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    ToolNotFound(std::io::Error),

    #[error("ffprobe/ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("video file not found: {0}")]
    VideoNotFound(String),

    #[error("video has no playable duration")]
    EmptyVideo,

    #[error("capture source failed: {0}")]
    Capture(String),

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pipeline task panicked or was aborted")]
    TaskFailed,
}
