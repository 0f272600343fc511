//! Detection pipelines built on top of the engine adapter: single-frame
//! video analysis and the live capture loop.

pub mod error;
pub mod live;
pub mod video;

pub use error::PipelineError;
pub use live::{FfmpegCaptureSource, FrameSource, LiveConfig, LiveSession, LiveSummary};
pub use video::{analyze_video, middle_timestamp, VideoAnalysis};
