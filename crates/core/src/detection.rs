//! Detection domain types shared by the detector, pipeline, and API crates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Center-based bounding box: (x, y) is the box center, in pixels of the
/// original image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Two-corner bounding box: (x1, y1) top-left, (x2, y2) bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn to_corners(self) -> CornerBox {
        CornerBox {
            x1: self.x - self.width / 2.0,
            y1: self.y - self.height / 2.0,
            x2: self.x + self.width / 2.0,
            y2: self.y + self.height / 2.0,
        }
    }
}

impl CornerBox {
    pub fn to_center(self) -> BoundingBox {
        BoundingBox {
            x: (self.x1 + self.x2) / 2.0,
            y: (self.y1 + self.y2) / 2.0,
            width: self.x2 - self.x1,
            height: self.y2 - self.y1,
        }
    }

    pub fn area(self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Intersection-over-union with another box. Returns 0.0 for disjoint
    /// or degenerate boxes.
    pub fn iou(self, other: CornerBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }
}

/// One detected object from a single inference run.
///
/// `detection_id` is unique per API response only; it is never used as a
/// storage key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub corners: CornerBox,
    pub detection_id: Uuid,
}

/// Where a detection run's input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    Image,
    Video,
    Webcam,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::Image => "image",
            DetectionSource::Video => "video",
            DetectionSource::Webcam => "webcam",
        }
    }
}

impl std::fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-class detection counts for one run (or an aggregate of many frames).
///
/// `total()` is always the sum of the individual counts; persisted events
/// store both so dashboards never re-derive the sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCounts(pub BTreeMap<String, u32>);

impl ClassCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `label`.
    pub fn record(&mut self, label: &str) {
        *self.0.entry(label.to_string()).or_insert(0) += 1;
    }

    /// Fold another set of counts into this one (live-frame aggregation).
    pub fn merge(&mut self, other: &ClassCounts) {
        for (label, count) in &other.0 {
            *self.0.entry(label.clone()).or_insert(0) += count;
        }
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, label: &str) -> u32 {
        self.0.get(label).copied().unwrap_or(0)
    }
}

impl<'a> FromIterator<&'a Detection> for ClassCounts {
    fn from_iter<I: IntoIterator<Item = &'a Detection>>(iter: I) -> Self {
        let mut counts = ClassCounts::new();
        for det in iter {
            counts.record(&det.label);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str) -> Detection {
        Detection {
            label: label.to_string(),
            class_id: 0,
            confidence: 0.9,
            bbox: BoundingBox {
                x: 50.0,
                y: 50.0,
                width: 20.0,
                height: 10.0,
            },
            corners: CornerBox {
                x1: 40.0,
                y1: 45.0,
                x2: 60.0,
                y2: 55.0,
            },
            detection_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn center_and_corner_representations_round_trip() {
        let bbox = BoundingBox {
            x: 100.0,
            y: 80.0,
            width: 40.0,
            height: 20.0,
        };
        let corners = bbox.to_corners();
        assert_eq!(corners.x1, 80.0);
        assert_eq!(corners.y1, 70.0);
        assert_eq!(corners.x2, 120.0);
        assert_eq!(corners.y2, 90.0);
        assert_eq!(corners.to_center(), bbox);
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let b = CornerBox {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
        };
        assert!((b.iou(b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = CornerBox {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
        };
        let b = CornerBox {
            x1: 20.0,
            y1: 20.0,
            x2: 30.0,
            y2: 30.0,
        };
        assert_eq!(a.iou(b), 0.0);
    }

    #[test]
    fn counts_total_equals_sum() {
        let detections = vec![det("ripe"), det("ripe"), det("unripe"), det("diseased")];
        let counts: ClassCounts = detections.iter().collect();
        assert_eq!(counts.get("ripe"), 2);
        assert_eq!(counts.get("unripe"), 1);
        assert_eq!(counts.get("diseased"), 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn merge_accumulates_across_frames() {
        let mut aggregate = ClassCounts::new();
        let frame1: ClassCounts = vec![det("ripe"), det("unripe")].iter().collect();
        let frame2: ClassCounts = vec![det("ripe")].iter().collect();
        aggregate.merge(&frame1);
        aggregate.merge(&frame2);
        assert_eq!(aggregate.get("ripe"), 2);
        assert_eq!(aggregate.total(), 3);
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DetectionSource::Webcam).unwrap(),
            "\"webcam\""
        );
        assert_eq!(DetectionSource::Video.as_str(), "video");
    }
}
