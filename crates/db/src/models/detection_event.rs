//! Detection event model and DTOs.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use agrivision_core::detection::{ClassCounts, Detection, DetectionSource};
use agrivision_core::types::{DbId, Timestamp};

/// One persisted record of a completed inference run.
///
/// `total` always equals the sum of `class_counts`; `raw_detections` may
/// diverge in length from `total` (no equality is enforced either way).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DetectionEvent {
    pub id: DbId,
    pub username: String,
    pub recorded_at: Timestamp,
    pub source: String,
    pub confidence_threshold: f32,
    pub class_counts: Json<ClassCounts>,
    pub total: i32,
    pub raw_detections: Json<Vec<Detection>>,
    pub file_name: Option<String>,
}

/// DTO for appending a detection event.
#[derive(Debug, Clone)]
pub struct CreateDetectionEvent {
    pub username: String,
    pub source: DetectionSource,
    pub confidence_threshold: f32,
    pub class_counts: ClassCounts,
    pub raw_detections: Vec<Detection>,
    pub file_name: Option<String>,
}

impl CreateDetectionEvent {
    /// The derived total persisted alongside the counts.
    pub fn total(&self) -> i32 {
        self.class_counts.total() as i32
    }
}
