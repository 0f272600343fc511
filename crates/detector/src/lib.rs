//! Detection engine adapter.
//!
//! Wraps a pre-trained YOLOv8-style ONNX model behind the [`ObjectDetector`]
//! trait: one RGB image and a confidence threshold in, an ordered list of
//! detections plus an annotated copy of the image out. The model artifact is
//! loaded once at process start ([`YoloDetector::load`]) and reused for
//! every call; the adapter never retrains or persists weights.

pub mod annotate;
pub mod engine;
pub mod error;
pub mod postprocess;
pub mod preprocess;

use image::RgbImage;

use agrivision_core::detection::Detection;

pub use engine::YoloDetector;
pub use error::DetectorError;

/// Result of one inference run.
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    /// Detections above the requested confidence threshold, ordered by
    /// descending confidence.
    pub detections: Vec<Detection>,
    /// Copy of the input with bounding boxes drawn.
    pub annotated: RgbImage,
}

/// Inference seam for everything that runs detection: the HTTP predict
/// handlers, the video pipeline, and the live worker. Tests substitute a
/// stub implementation so no model artifact is needed.
pub trait ObjectDetector: Send + Sync {
    /// Run inference on one decoded RGB image.
    ///
    /// `confidence_threshold` is the minimum score for a detection to be
    /// reported, in (0, 1].
    fn detect(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<DetectionOutput, DetectorError>;
}
