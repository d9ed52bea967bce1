//! Segmentation pipeline
//!
//! Orchestrates one request end to end: decode and normalize the uploads,
//! composite them into the 2×2 grid, persist the composite to request-scoped
//! scratch space, run inference, and extract the thresholded mask. The
//! backend is injected, loaded once at startup and shared read-only across
//! requests.

use crate::config::ServiceConfig;
use crate::error::{FaceSegError, Result};
use crate::inference::InferenceBackend;
use crate::mask;
use crate::types::{PredictionResult, ProcessingTimings, UploadedImage};
use crate::utils::{compose_tiles, image_to_tensor, normalize_to_tile};
use image::RgbImage;
use ndarray::{Array2, Array4, Axis};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Number of tile slots in the composite grid
pub const SLOT_COUNT: usize = 4;

/// The request-processing pipeline
///
/// Holds the loaded backend as shared, immutable state. All per-request
/// entities (uploads, tiles, composite, prediction, result) live and die
/// within one `process` call.
pub struct SegmentationPipeline {
    backend: Arc<dyn InferenceBackend>,
    config: ServiceConfig,
    tile_side: u32,
}

impl SegmentationPipeline {
    /// Create a pipeline around a loaded backend
    ///
    /// # Errors
    /// Returns `FaceSegError::Model` when the backend declares a tile side of
    /// zero, and `FaceSegError::Io` when the configured scratch root cannot
    /// be created.
    pub fn new(config: ServiceConfig, backend: Arc<dyn InferenceBackend>) -> Result<Self> {
        let tile_side = backend.tile_side();
        if tile_side == 0 {
            return Err(FaceSegError::model(
                "model input width is too small to derive a tile side",
            ));
        }

        if let Some(ref scratch) = config.scratch_dir {
            std::fs::create_dir_all(scratch)?;
        }

        Ok(Self {
            backend,
            config,
            tile_side,
        })
    }

    /// Side length S of one normalized tile
    #[must_use]
    pub fn tile_side(&self) -> u32 {
        self.tile_side
    }

    /// Process one request
    ///
    /// Accepts 1 to 4 uploads; slots beyond the provided uploads repeat
    /// upload #1, so a single image fills all four grid positions.
    ///
    /// # Errors
    /// - `FaceSegError::InvalidInput` for an empty or oversized upload list,
    ///   a non-finite threshold, or undecodable image bytes
    /// - `FaceSegError::EmptyMask` when thresholding selects no pixels
    /// - `FaceSegError::Inference` / `Processing` / `Io` for pipeline failures
    #[instrument(skip(self, uploads), fields(uploads = uploads.len(), threshold))]
    pub fn process(&self, uploads: &[UploadedImage], threshold: f32) -> Result<PredictionResult> {
        if uploads.is_empty() {
            return Err(FaceSegError::invalid_input("at least one upload is required"));
        }
        if uploads.len() > SLOT_COUNT {
            return Err(FaceSegError::invalid_input(format!(
                "at most {SLOT_COUNT} uploads are accepted, got {}",
                uploads.len()
            )));
        }
        if !threshold.is_finite() {
            return Err(FaceSegError::invalid_input("threshold must be a finite number"));
        }

        let mut timings = ProcessingTimings::default();
        let total_start = Instant::now();

        let scratch = self.create_scratch_dir()?;

        // Preprocess: persist uploads, fill empty slots with upload #1,
        // normalize each slot and composite the grid.
        let preprocess_start = Instant::now();
        self.persist_uploads(scratch.path(), uploads)?;

        let mut tiles = Vec::with_capacity(SLOT_COUNT);
        for slot in 0..SLOT_COUNT {
            let upload = uploads.get(slot).unwrap_or(&uploads[0]);
            let decoded = upload.decode().map_err(|e| {
                FaceSegError::invalid_input(format!("slot {} is not a decodable image: {e}", slot + 1))
            })?;
            tiles.push(normalize_to_tile(&decoded, self.tile_side)?);
        }
        let tiles: [RgbImage; 4] = tiles
            .try_into()
            .map_err(|_| FaceSegError::processing("tile slot count mismatch"))?;

        let composite = compose_tiles(&tiles, self.tile_side)?;

        // The model adapter contract reads its pixels from the persisted
        // composite, so the tensor and the mask RGB share one decoded buffer.
        let composite_path = scratch.path().join("composite.png");
        composite.save(&composite_path)?;
        let composite = image::open(&composite_path)
            .map_err(|e| FaceSegError::processing(format!("failed to reload composite: {e}")))?
            .to_rgb8();

        let input_tensor = image_to_tensor(&composite);
        timings.preprocessing_ms = preprocess_start.elapsed().as_millis() as u64;

        // Inference
        let inference_start = Instant::now();
        let output_tensor = self.backend.infer(&input_tensor)?;
        timings.inference_ms = inference_start.elapsed().as_millis() as u64;

        // Postprocess: squeeze the batch entry and threshold it.
        let postprocess_start = Instant::now();
        let prediction = self.squeeze_prediction(&output_tensor)?;
        let outcome = mask::extract_mask(&prediction, &composite, threshold)?;
        timings.postprocessing_ms = postprocess_start.elapsed().as_millis() as u64;
        timings.total_ms = total_start.elapsed().as_millis() as u64;

        let dimensions = composite.dimensions();
        self.release_scratch(scratch);

        info!(
            selected_pixels = outcome.selected_pixels,
            width = dimensions.0,
            height = dimensions.1,
            total_ms = timings.total_ms,
            inference_ms = timings.inference_ms,
            "request processed"
        );

        Ok(PredictionResult {
            image: outcome.image,
            selected_pixels: outcome.selected_pixels,
            dimensions,
            timings,
        })
    }

    /// Create the per-request scratch directory
    ///
    /// Named by a random UUID rather than a timestamp, so two requests in
    /// the same instant cannot collide. The directory is removed when the
    /// `TempDir` guard drops, on success and failure paths alike.
    fn create_scratch_dir(&self) -> Result<TempDir> {
        let prefix = format!("faceseg-{}-", Uuid::new_v4());
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let scratch = match self.config.scratch_dir {
            Some(ref root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        debug!(scratch = %scratch.path().display(), "request scratch directory created");
        Ok(scratch)
    }

    /// Write the raw upload bytes into the scratch directory
    fn persist_uploads(&self, dir: &std::path::Path, uploads: &[UploadedImage]) -> Result<()> {
        for (i, upload) in uploads.iter().enumerate() {
            let path = dir.join(format!("slot-{i}.img"));
            std::fs::write(&path, &upload.bytes)?;
            debug!(
                slot = i,
                bytes = upload.bytes.len(),
                filename = upload.filename.as_deref().unwrap_or("-"),
                "upload persisted"
            );
        }
        Ok(())
    }

    /// Drop or keep the scratch directory per configuration
    fn release_scratch(&self, scratch: TempDir) {
        if self.config.keep_artifacts {
            let kept: PathBuf = scratch.keep();
            warn!(path = %kept.display(), "keeping request artifacts");
        }
        // Otherwise the TempDir drop removes the directory.
    }

    /// Validate the output tensor and squeeze it to the single batch entry
    fn squeeze_prediction(&self, output: &Array4<f32>) -> Result<Array2<f32>> {
        let side = (self.tile_side * 2) as usize;
        let shape = output.shape();
        if shape != [1, side, side, 1] {
            return Err(FaceSegError::inference(format!(
                "expected output shape [1, {side}, {side}, 1], got {shape:?}"
            )));
        }

        let plane = output
            .index_axis(Axis(0), 0)
            .index_axis(Axis(2), 0)
            .to_owned();
        Ok(plane)
    }
}
