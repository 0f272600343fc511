//! ONNX Runtime backed YOLO inference engine.

use image::RgbImage;
use ndarray::Ix3;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::DetectorError;
use crate::postprocess::decode_predictions;
use crate::{annotate, preprocess, DetectionOutput, ObjectDetector};

/// Default IoU threshold for non-maximum suppression.
const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// A loaded YOLOv8-style ONNX model.
///
/// `Session::run` takes `&mut self` in ort 2.0, so the session sits behind a
/// mutex; inference calls for one process are serialized. Callers that need
/// throughput run `detect` on a blocking thread.
pub struct YoloDetector {
    session: Mutex<Session>,
    labels: Vec<String>,
    input_size: u32,
    iou_threshold: f32,
}

impl YoloDetector {
    /// Load a model artifact from disk. Called once at startup; a missing or
    /// corrupt artifact is fatal.
    pub fn load(
        model_path: impl AsRef<Path>,
        labels: Vec<String>,
        input_size: u32,
    ) -> Result<Self, DetectorError> {
        let path = model_path.as_ref();
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(2))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|source| DetectorError::ModelLoad {
                path: path.display().to_string(),
                source,
            })?;

        info!(
            model = %path.display(),
            classes = labels.len(),
            input_size,
            "loaded detection model"
        );
        Ok(Self {
            session: Mutex::new(session),
            labels,
            input_size,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<DetectionOutput, DetectorError> {
        let (letterboxed, params) = preprocess::letterbox(image, self.input_size);
        let tensor = preprocess::to_chw_tensor(&letterboxed);

        let mut session = self
            .session
            .lock()
            .map_err(|_| DetectorError::Inference("session lock poisoned".to_string()))?;
        let inputs = ort::inputs!["images" => tensor.view()]
            .map_err(|e| DetectorError::Inference(e.to_string()))?;
        let outputs = session
            .run(inputs)
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        // YOLOv8 head: [1, 4 + num_classes, num_boxes].
        let raw = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::Inference(e.to_string()))?;
        let raw = raw
            .into_dimensionality::<Ix3>()
            .map_err(|e| DetectorError::Inference(format!("unexpected output shape: {e}")))?;

        let detections = decode_predictions(
            raw,
            &self.labels,
            confidence_threshold,
            params,
            self.iou_threshold,
        );
        drop(outputs);
        drop(session);

        debug!(
            count = detections.len(),
            confidence_threshold, "inference complete"
        );
        let annotated = annotate::draw_detections(image, &detections);
        Ok(DetectionOutput {
            detections,
            annotated,
        })
    }
}
