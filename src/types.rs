//! Core types for the segmentation pipeline

use crate::error::Result;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// One uploaded image slot, owned by a single request
///
/// Raw bytes as received from the multipart part, plus the declared filename
/// when the client sent one. Discarded with the request's scratch directory.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Raw image bytes (JPEG, PNG, ...)
    pub bytes: Vec<u8>,
    /// Filename declared by the client, if any
    pub filename: Option<String>,
}

impl UploadedImage {
    /// Create an upload from raw bytes
    #[must_use]
    pub fn new(bytes: Vec<u8>, filename: Option<String>) -> Self {
        Self { bytes, filename }
    }

    /// Decode the raw bytes into an image
    ///
    /// # Errors
    /// Returns `FaceSegError::Image` when the bytes are not a decodable image.
    pub fn decode(&self) -> Result<DynamicImage> {
        Ok(image::load_from_memory(&self.bytes)?)
    }
}

/// Timing breakdown for one pipeline invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Decode, normalize, composite and tensor conversion
    pub preprocessing_ms: u64,

    /// Forward pass
    pub inference_ms: u64,

    /// Mask extraction
    pub postprocessing_ms: u64,

    /// Total end-to-end pipeline time
    pub total_ms: u64,
}

/// Result of one segmentation request
///
/// The RGBA image is the composite with a binary alpha channel: 255 where the
/// prediction fell strictly below the request threshold, 0 elsewhere.
#[derive(Debug, Clone)]
pub struct PredictionResult {
    /// Composite RGB with the thresholded alpha channel applied
    pub image: RgbaImage,

    /// Number of pixels with alpha 255 (always > 0; zero is an error)
    pub selected_pixels: usize,

    /// Width and height of the result (both equal to twice the tile side)
    pub dimensions: (u32, u32),

    /// Timing breakdown for this invocation
    pub timings: ProcessingTimings,
}

impl PredictionResult {
    /// Encode the result as PNG bytes
    ///
    /// # Errors
    /// Returns `FaceSegError::Image` on encoding failures.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        DynamicImage::ImageRgba8(self.image.clone())
            .write_to(&mut cursor, image::ImageFormat::Png)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_uploaded_image_decode_rejects_garbage() {
        let upload = UploadedImage::new(vec![0, 1, 2, 3], Some("junk.jpg".to_string()));
        assert!(upload.decode().is_err());
    }

    #[test]
    fn test_uploaded_image_decode_png() {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();

        let upload = UploadedImage::new(bytes, None);
        let decoded = upload.decode().unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }

    #[test]
    fn test_png_roundtrip_preserves_alpha() {
        let image = RgbaImage::from_pixel(8, 8, Rgba([200, 100, 50, 255]));
        let result = PredictionResult {
            image,
            selected_pixels: 64,
            dimensions: (8, 8),
            timings: ProcessingTimings::default(),
        };

        let bytes = result.to_png_bytes().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.get_pixel(3, 3), &Rgba([200, 100, 50, 255]));
    }
}
