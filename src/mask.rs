//! Threshold mask extraction
//!
//! Walks the prediction plane against the composite pixels and a per-request
//! threshold, producing an RGBA image whose alpha channel marks the selected
//! pixels. Lower prediction values mean higher target-class likelihood in
//! this model's output convention, so selection is strict less-than and
//! callers tune the threshold to control mask size.

use crate::error::{FaceSegError, Result};
use image::{Rgba, RgbaImage};
use ndarray::Array2;
use tracing::debug;

/// Result of mask extraction
#[derive(Debug, Clone)]
pub struct MaskOutcome {
    /// Composite RGB with binary alpha applied
    pub image: RgbaImage,
    /// Number of selected (alpha 255) pixels, always > 0
    pub selected_pixels: usize,
}

/// Apply the threshold to the prediction plane and build the RGBA result
///
/// For every pixel: `prediction < threshold` selects the pixel (alpha 255),
/// anything else, including exact equality, leaves it transparent (alpha 0).
/// RGB channels are copied verbatim from the composite. There is no
/// cross-pixel interaction, so this is a single elementwise pass over the
/// zipped buffers.
///
/// # Errors
/// - `FaceSegError::Processing` when prediction and composite sizes differ
/// - `FaceSegError::EmptyMask` when no pixel at all falls below the threshold
pub fn extract_mask(
    prediction: &Array2<f32>,
    composite: &image::RgbImage,
    threshold: f32,
) -> Result<MaskOutcome> {
    let (width, height) = composite.dimensions();
    let (rows, cols) = prediction.dim();
    if rows != height as usize || cols != width as usize {
        return Err(FaceSegError::processing(format!(
            "prediction plane is {}x{}, composite is {}x{}",
            cols, rows, width, height
        )));
    }

    let mut image = RgbaImage::new(width, height);
    let mut selected_pixels = 0usize;

    // Both buffers are row-major, so a flat zip visits matching pixels.
    for ((out, src), score) in image
        .pixels_mut()
        .zip(composite.pixels())
        .zip(prediction.iter())
    {
        let alpha = if *score < threshold {
            selected_pixels += 1;
            255
        } else {
            0
        };
        *out = Rgba([src[0], src[1], src[2], alpha]);
    }

    if selected_pixels == 0 {
        return Err(FaceSegError::EmptyMask { threshold });
    }

    debug!(selected_pixels, threshold, "mask extracted");
    Ok(MaskOutcome {
        image,
        selected_pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn composite(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(color))
    }

    #[test]
    fn test_uniformly_below_threshold_selects_everything() {
        let prediction = Array2::from_elem((4, 4), -1.0f32);
        let source = composite(4, 4, [90, 60, 30]);

        let outcome = extract_mask(&prediction, &source, 0.0).unwrap();
        assert_eq!(outcome.selected_pixels, 16);
        for pixel in outcome.image.pixels() {
            assert_eq!(pixel, &Rgba([90, 60, 30, 255]));
        }
    }

    #[test]
    fn test_uniformly_above_threshold_fails() {
        let prediction = Array2::from_elem((4, 4), 0.9f32);
        let source = composite(4, 4, [1, 2, 3]);

        let result = extract_mask(&prediction, &source, 0.0);
        assert!(matches!(result, Err(FaceSegError::EmptyMask { .. })));
    }

    #[test]
    fn test_exact_threshold_is_not_selected() {
        // Strict less-than: equality must leave the pixel transparent
        let mut prediction = Array2::from_elem((2, 2), -0.5f32);
        prediction[[0, 0]] = -0.6;
        let source = composite(2, 2, [10, 10, 10]);

        let outcome = extract_mask(&prediction, &source, -0.5).unwrap();
        assert_eq!(outcome.selected_pixels, 1);
        assert_eq!(outcome.image.get_pixel(0, 0)[3], 255);
        assert_eq!(outcome.image.get_pixel(1, 0)[3], 0);
        assert_eq!(outcome.image.get_pixel(0, 1)[3], 0);
        assert_eq!(outcome.image.get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn test_rgb_copied_verbatim() {
        let prediction = Array2::from_elem((2, 3), -1.0f32);
        let mut source = RgbImage::new(3, 2);
        for (i, pixel) in source.pixels_mut().enumerate() {
            *pixel = Rgb([i as u8, (i * 2) as u8, (i * 3) as u8]);
        }

        let outcome = extract_mask(&prediction, &source, 0.0).unwrap();
        for (out, src) in outcome.image.pixels().zip(source.pixels()) {
            assert_eq!(&out.0[..3], &src.0[..]);
        }
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let prediction = Array2::from_elem((4, 4), -1.0f32);
        let source = composite(8, 8, [0, 0, 0]);
        assert!(matches!(
            extract_mask(&prediction, &source, 0.0),
            Err(FaceSegError::Processing(_))
        ));
    }
}
