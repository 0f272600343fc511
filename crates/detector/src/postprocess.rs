//! YOLO output decoding: raw `[1, 4 + C, N]` tensors into detections in
//! original-image pixel space.

use ndarray::ArrayView3;
use uuid::Uuid;

use agrivision_core::detection::{CornerBox, Detection};

/// Mapping from letterboxed model space back to original pixels.
#[derive(Debug, Clone, Copy)]
pub struct LetterboxParams {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_w: u32,
    pub orig_h: u32,
}

impl LetterboxParams {
    /// Undo the letterbox transform for one model-space corner box, clamping
    /// to the original image bounds.
    fn to_original(&self, boxed: CornerBox) -> CornerBox {
        let w = self.orig_w as f32;
        let h = self.orig_h as f32;
        CornerBox {
            x1: ((boxed.x1 - self.pad_x) / self.scale).clamp(0.0, w),
            y1: ((boxed.y1 - self.pad_y) / self.scale).clamp(0.0, h),
            x2: ((boxed.x2 - self.pad_x) / self.scale).clamp(0.0, w),
            y2: ((boxed.y2 - self.pad_y) / self.scale).clamp(0.0, h),
        }
    }
}

/// Decode one `[1, 4 + C, N]` output tensor.
///
/// Each of the N candidate boxes carries center-xywh in model space followed
/// by C per-class scores. A candidate survives when its best class score
/// meets `confidence_threshold`; surviving boxes are mapped back to original
/// pixels, deduplicated with class-wise NMS, and returned ordered by
/// descending confidence.
pub fn decode_predictions(
    output: ArrayView3<'_, f32>,
    labels: &[String],
    confidence_threshold: f32,
    params: LetterboxParams,
    iou_threshold: f32,
) -> Vec<Detection> {
    let num_classes = labels.len();
    let num_boxes = output.shape()[2];

    let mut candidates = Vec::new();
    for i in 0..num_boxes {
        let mut best_class = 0usize;
        let mut best_score = 0.0f32;
        for c in 0..num_classes {
            let score = output[[0, 4 + c, i]];
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }
        if best_score < confidence_threshold {
            continue;
        }

        let cx = output[[0, 0, i]];
        let cy = output[[0, 1, i]];
        let w = output[[0, 2, i]];
        let h = output[[0, 3, i]];
        let model_box = CornerBox {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        };
        let corners = params.to_original(model_box);

        candidates.push(Detection {
            label: labels[best_class].clone(),
            class_id: best_class,
            confidence: best_score,
            bbox: corners.to_center(),
            corners,
            detection_id: Uuid::new_v4(),
        });
    }

    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    nms(candidates, iou_threshold)
}

/// Greedy class-wise non-maximum suppression. Input must be ordered by
/// descending confidence; output preserves that order.
fn nms(candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    let mut kept: Vec<Detection> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id
                && k.corners.iou(candidate.corners) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn labels() -> Vec<String> {
        vec!["ripe".to_string(), "unripe".to_string()]
    }

    fn identity_params() -> LetterboxParams {
        LetterboxParams {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            orig_w: 640,
            orig_h: 640,
        }
    }

    /// Build a `[1, 4 + 2, N]` tensor from (cx, cy, w, h, ripe, unripe) rows.
    fn tensor(boxes: &[[f32; 6]]) -> Array3<f32> {
        let mut out = Array3::<f32>::zeros((1, 6, boxes.len()));
        for (i, b) in boxes.iter().enumerate() {
            for (attr, &v) in b.iter().enumerate() {
                out[[0, attr, i]] = v;
            }
        }
        out
    }

    #[test]
    fn picks_the_best_class_and_filters_by_confidence() {
        let out = tensor(&[
            [100.0, 100.0, 40.0, 40.0, 0.9, 0.2],
            [300.0, 300.0, 40.0, 40.0, 0.1, 0.2], // below threshold
        ]);
        let dets =
            decode_predictions(out.view(), &labels(), 0.5, identity_params(), 0.45);

        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].label, "ripe");
        assert_eq!(dets[0].class_id, 0);
        assert!((dets[0].confidence - 0.9).abs() < 1e-6);
        assert!((dets[0].bbox.x - 100.0).abs() < 1e-3);
        assert!((dets[0].bbox.width - 40.0).abs() < 1e-3);
    }

    #[test]
    fn maps_letterboxed_boxes_back_to_original_pixels() {
        // 1280x640 source letterboxed into 640: scale 0.5, pad_y 160.
        let params = LetterboxParams {
            scale: 0.5,
            pad_x: 0.0,
            pad_y: 160.0,
            orig_w: 1280,
            orig_h: 640,
        };
        let out = tensor(&[[320.0, 320.0, 100.0, 50.0, 0.8, 0.1]]);
        let dets = decode_predictions(out.view(), &labels(), 0.5, params, 0.45);

        assert_eq!(dets.len(), 1);
        let b = dets[0].bbox;
        assert!((b.x - 640.0).abs() < 1e-3);
        assert!((b.y - 320.0).abs() < 1e-3);
        assert!((b.width - 200.0).abs() < 1e-3);
        assert!((b.height - 100.0).abs() < 1e-3);
    }

    #[test]
    fn clamps_boxes_to_image_bounds() {
        // Box hanging off the left edge.
        let out = tensor(&[[5.0, 100.0, 40.0, 40.0, 0.9, 0.0]]);
        let dets =
            decode_predictions(out.view(), &labels(), 0.5, identity_params(), 0.45);

        assert_eq!(dets[0].corners.x1, 0.0);
        assert!(dets[0].corners.x2 > 0.0);
    }

    #[test]
    fn nms_drops_overlapping_same_class_boxes() {
        let out = tensor(&[
            [100.0, 100.0, 40.0, 40.0, 0.9, 0.0],
            [102.0, 101.0, 40.0, 40.0, 0.7, 0.0], // near-duplicate, same class
            [100.0, 100.0, 40.0, 40.0, 0.0, 0.8], // same spot, other class
        ]);
        let dets =
            decode_predictions(out.view(), &labels(), 0.5, identity_params(), 0.45);

        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].label, "ripe");
        assert_eq!(dets[1].label, "unripe");
    }

    #[test]
    fn results_are_ordered_by_descending_confidence() {
        let out = tensor(&[
            [100.0, 100.0, 40.0, 40.0, 0.6, 0.0],
            [300.0, 300.0, 40.0, 40.0, 0.95, 0.0],
            [500.0, 500.0, 40.0, 40.0, 0.0, 0.75],
        ]);
        let dets =
            decode_predictions(out.view(), &labels(), 0.5, identity_params(), 0.45);

        let confidences: Vec<f32> = dets.iter().map(|d| d.confidence).collect();
        assert!(confidences.windows(2).all(|w| w[0] >= w[1]));
    }
}
