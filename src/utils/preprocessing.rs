//! Image normalization and tensor conversion
//!
//! Turns an arbitrary upload into a fixed S×S white-padded tile, and a
//! decoded composite into the NHWC tensor the model expects.

use crate::error::{FaceSegError, Result};
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use ndarray::Array4;

/// Padding color for the tile and composite canvases
pub const CANVAS_WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Normalize an image to an S×S tile
///
/// Scales the image, preserving aspect ratio, so its longer dimension equals
/// `side` (the shorter dimension is computed by ceiling division), then
/// pastes it centered on a white `side`×`side` canvas. Centering offsets are
/// rounded half-up; if rounding ever makes the scaled image overhang the
/// canvas, the overhanging pixels are clipped rather than treated as an
/// error.
///
/// # Errors
/// Returns `FaceSegError::InvalidInput` for zero-sized images.
pub fn normalize_to_tile(image: &DynamicImage, side: u32) -> Result<RgbImage> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(FaceSegError::invalid_input(
            "uploaded image has zero width or height",
        ));
    }

    let (new_width, new_height) = fit_dimensions(width, height, side);
    let resized = image::imageops::resize(
        &rgb,
        new_width,
        new_height,
        image::imageops::FilterType::Lanczos3,
    );

    let mut canvas = ImageBuffer::from_pixel(side, side, CANVAS_WHITE);
    let offset_x = centering_offset(side, new_width);
    let offset_y = centering_offset(side, new_height);

    // Clips silently when offset + dimension exceeds the canvas.
    for (x, y, pixel) in resized.enumerate_pixels() {
        let canvas_x = x + offset_x;
        let canvas_y = y + offset_y;
        if canvas_x < side && canvas_y < side {
            canvas.put_pixel(canvas_x, canvas_y, *pixel);
        }
    }

    Ok(canvas)
}

/// Scale dimensions so the longer side equals `side`, preserving aspect ratio
///
/// Width wins ties: `width >= height` clamps the width. The shorter side is
/// computed with ceiling division, so it never rounds to zero.
fn fit_dimensions(width: u32, height: u32, side: u32) -> (u32, u32) {
    let side = u64::from(side);
    let (w, h) = (u64::from(width), u64::from(height));
    if w >= h {
        let new_height = (side * h).div_ceil(w);
        (side as u32, new_height as u32)
    } else {
        let new_width = (side * w).div_ceil(h);
        (new_width as u32, side as u32)
    }
}

/// Centering offset for pasting a scaled dimension onto the canvas
///
/// `(side - dim) / 2` rounded half-up. The fractional part is always 0 or .5,
/// so integer ceiling division is exact.
fn centering_offset(side: u32, dim: u32) -> u32 {
    side.saturating_sub(dim).div_ceil(2)
}

/// Convert a decoded composite into the model's NHWC input tensor
///
/// Pixel values are mapped from 0..255 into roughly -1..1 via
/// `v / 127.5 - 1`, with a leading batch dimension of 1.
#[must_use]
pub fn image_to_tensor(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, height as usize, width as usize, 3));

    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = f32::from(pixel[c]) / 127.5 - 1.0;
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_fit_dimensions_square() {
        assert_eq!(fit_dimensions(100, 100, 256), (256, 256));
    }

    #[test]
    fn test_fit_dimensions_wide() {
        // 400x100 at side 256: width clamped, height = ceil(256 * 100 / 400)
        assert_eq!(fit_dimensions(400, 100, 256), (256, 64));
        // Non-exact ratio rounds up
        assert_eq!(fit_dimensions(300, 100, 256), (256, 86));
    }

    #[test]
    fn test_fit_dimensions_tall() {
        assert_eq!(fit_dimensions(100, 400, 256), (64, 256));
        assert_eq!(fit_dimensions(100, 300, 256), (86, 256));
    }

    #[test]
    fn test_centering_offset_documented_case() {
        // S=256, scaled width 200 -> offset 28
        assert_eq!(centering_offset(256, 200), 28);
    }

    #[test]
    fn test_centering_offset_rounds_half_up() {
        // (256 - 201) / 2 = 27.5 -> 28
        assert_eq!(centering_offset(256, 201), 28);
        assert_eq!(centering_offset(256, 256), 0);
    }

    #[test]
    fn test_normalize_output_is_exactly_square() {
        for (w, h) in [(100, 100), (640, 200), (200, 640), (1, 1), (999, 3)] {
            let tile = normalize_to_tile(&solid(w, h, [40, 80, 120]), 256).unwrap();
            assert_eq!(tile.dimensions(), (256, 256), "input {}x{}", w, h);
        }
    }

    #[test]
    fn test_normalize_pads_with_white() {
        // Wide image leaves white bands above and below the scaled content
        let tile = normalize_to_tile(&solid(400, 100, [0, 0, 0]), 256).unwrap();
        assert_eq!(tile.get_pixel(0, 0), &CANVAS_WHITE);
        assert_eq!(tile.get_pixel(255, 255), &CANVAS_WHITE);
        // Center row carries the content
        assert_eq!(tile.get_pixel(128, 128), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_normalize_rejects_zero_sized() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(normalize_to_tile(&empty, 256).is_err());
    }

    #[test]
    fn test_tensor_shape_and_range() {
        let image = RgbImage::from_pixel(4, 2, Rgb([0, 127, 255]));
        let tensor = image_to_tensor(&image);

        assert_eq!(tensor.shape(), &[1, 2, 4, 3]);
        assert!((tensor[[0, 0, 0, 0]] - (-1.0)).abs() < 1e-6);
        assert!((tensor[[0, 0, 0, 1]] - (127.0 / 127.5 - 1.0)).abs() < 1e-6);
        assert!((tensor[[0, 0, 0, 2]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_tensor_white_maps_to_one() {
        let image = RgbImage::from_pixel(2, 2, CANVAS_WHITE);
        let tensor = image_to_tensor(&image);
        for v in tensor.iter() {
            assert!((v - 1.0).abs() < 1e-6);
        }
    }
}
