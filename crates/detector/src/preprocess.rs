//! Image decoding and YOLO input preprocessing.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ndarray::Array4;

use crate::error::DetectorError;
use crate::postprocess::LetterboxParams;

/// Grey fill used for letterbox padding (standard YOLOv8 value).
const PAD_GREY: u8 = 114;

/// Decode uploaded bytes into an RGB image. Format is sniffed from the
/// content, not from a filename.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, DetectorError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| DetectorError::ImageDecode(e.to_string()))?;
    Ok(img.to_rgb8())
}

/// Letterbox an image into a `target`x`target` square: scale to fit while
/// preserving aspect ratio, pad the remainder with grey, centered.
///
/// Returns the padded image together with the parameters needed to map
/// model-space boxes back to original pixels.
pub fn letterbox(img: &RgbImage, target: u32) -> (RgbImage, LetterboxParams) {
    let (orig_w, orig_h) = img.dimensions();
    let scale = (target as f32 / orig_w.max(orig_h) as f32).min(1.0);
    let new_w = ((orig_w as f32 * scale) as u32).max(1);
    let new_h = ((orig_h as f32 * scale) as u32).max(1);

    let resized = imageops::resize(img, new_w, new_h, FilterType::Triangle);

    let pad_x = (target - new_w) / 2;
    let pad_y = (target - new_h) / 2;

    let mut canvas = RgbImage::from_pixel(target, target, Rgb([PAD_GREY, PAD_GREY, PAD_GREY]));
    imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

    let params = LetterboxParams {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
        orig_w,
        orig_h,
    };
    (canvas, params)
}

/// Convert an RGB image into a normalized `[1, 3, H, W]` CHW tensor.
pub fn to_chw_tensor(img: &RgbImage) -> Array4<f32> {
    let (w, h) = img.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, 3, h as usize, w as usize));
    for (x, y, pixel) in img.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel.0[c] as f32 / 255.0;
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_non_image_bytes() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DetectorError::ImageDecode(_)));
    }

    #[test]
    fn decode_accepts_png_bytes() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn letterbox_pads_the_short_side() {
        // 200x100 into 640: upscaling is clamped at 1.0, so the image
        // lands at its original size, centered on the grey canvas.
        let img = RgbImage::from_pixel(200, 100, Rgb([255, 0, 0]));
        let (canvas, params) = letterbox(&img, 640);

        assert_eq!(canvas.dimensions(), (640, 640));
        assert_eq!(params.scale, 1.0);
        assert_eq!(params.pad_x, 220.0);
        assert_eq!(params.pad_y, 270.0);
        // Pad area is grey, image area keeps its pixels.
        assert_eq!(canvas.get_pixel(0, 0).0, [PAD_GREY, PAD_GREY, PAD_GREY]);
        assert_eq!(canvas.get_pixel(320, 320).0, [255, 0, 0]);
    }

    #[test]
    fn letterbox_downscales_large_images() {
        let img = RgbImage::from_pixel(1280, 640, Rgb([0, 255, 0]));
        let (canvas, params) = letterbox(&img, 640);

        assert_eq!(canvas.dimensions(), (640, 640));
        assert_eq!(params.scale, 0.5);
        assert_eq!(params.pad_x, 0.0);
        assert_eq!(params.pad_y, 160.0);
        assert_eq!(params.orig_w, 1280);
        assert_eq!(params.orig_h, 640);
    }

    #[test]
    fn tensor_is_chw_normalized() {
        let mut img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 128, 0]));
        let tensor = to_chw_tensor(&img);

        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert!((tensor[[0, 1, 0, 1]] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 2, 0, 1]], 0.0);
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
    }
}
