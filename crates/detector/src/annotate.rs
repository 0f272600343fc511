//! Bounding-box overlay rendering.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use agrivision_core::detection::Detection;

/// Per-class box colors, indexed by `class_id` modulo the palette size.
const PALETTE: [Rgb<u8>; 4] = [
    Rgb([46, 204, 64]),  // green
    Rgb([255, 196, 0]),  // amber
    Rgb([255, 65, 54]),  // red
    Rgb([0, 116, 217]),  // blue
];

const BOX_THICKNESS: i32 = 2;

pub fn class_color(class_id: usize) -> Rgb<u8> {
    PALETTE[class_id % PALETTE.len()]
}

/// Draw hollow rectangles for every detection onto a copy of `image`.
pub fn draw_detections(image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut canvas = image.clone();
    let (w, h) = canvas.dimensions();

    for det in detections {
        let c = det.corners;
        let x = c.x1.round().max(0.0) as i32;
        let y = c.y1.round().max(0.0) as i32;
        let bw = ((c.x2 - c.x1).round() as i32).max(1);
        let bh = ((c.y2 - c.y1).round() as i32).max(1);
        let color = class_color(det.class_id);

        // Nested rects give a thick border without a filled interior.
        for t in 0..BOX_THICKNESS {
            let rx = x + t;
            let ry = y + t;
            let rw = bw - 2 * t;
            let rh = bh - 2 * t;
            if rw <= 0 || rh <= 0 || rx >= w as i32 || ry >= h as i32 {
                break;
            }
            draw_hollow_rect_mut(
                &mut canvas,
                Rect::at(rx, ry).of_size(rw as u32, rh as u32),
                color,
            );
        }
    }
    canvas
}
