//! Tract backend for the segmentation model
//!
//! Loads the ONNX model once at startup with Tract, a pure Rust inference
//! engine, and exposes a single forward pass through the `InferenceBackend`
//! trait. The model's declared input shape fixes the tile side for the whole
//! pipeline, so shape introspection failures are startup-fatal.

use crate::error::{FaceSegError, Result};
use crate::inference::InferenceBackend;
use ndarray::Array4;
use std::path::Path;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, info};

/// Type alias for the runnable Tract model
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Tract-based inference backend
pub struct TractBackend {
    model: TractModel,
    input_shape: (usize, usize, usize, usize),
}

impl std::fmt::Debug for TractBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TractBackend")
            .field("input_shape", &self.input_shape)
            .finish_non_exhaustive()
    }
}

impl TractBackend {
    /// Load and optimize the model from an ONNX file
    ///
    /// The declared input fact must be a concrete 4-D NHWC shape with batch
    /// size 1, square spatial dimensions of even size, and 3 channels.
    ///
    /// # Errors
    /// Returns `FaceSegError::Model` for a missing or malformed model file
    /// and for any input shape the pipeline cannot serve.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let load_start = Instant::now();

        let typed = onnx()
            .model_for_path(path)
            .map_err(|e| {
                FaceSegError::model(format!("failed to load ONNX model '{}': {e}", path.display()))
            })?
            .into_optimized()
            .map_err(|e| {
                FaceSegError::model(format!(
                    "failed to optimize model '{}': {e}",
                    path.display()
                ))
            })?;

        let input_shape = Self::introspect_input_shape(&typed)?;

        let model = typed.into_runnable().map_err(|e| {
            FaceSegError::model(format!("failed to make model runnable: {e}"))
        })?;

        info!(
            model = %path.display(),
            input_shape = ?input_shape,
            tile_side = input_shape.2 / 2,
            load_ms = load_start.elapsed().as_millis() as u64,
            "Tract backend initialized"
        );

        Ok(Self { model, input_shape })
    }

    /// Read and validate the declared input shape of the optimized model
    fn introspect_input_shape(model: &TypedModel) -> Result<(usize, usize, usize, usize)> {
        let fact = model
            .input_fact(0)
            .map_err(|e| FaceSegError::model(format!("model has no input fact: {e}")))?;

        let dims: Vec<usize> = fact
            .shape
            .as_concrete()
            .ok_or_else(|| {
                FaceSegError::model("model input shape has symbolic dimensions; a fixed NHWC shape is required")
            })?
            .to_vec();

        let [batch, height, width, channels] = dims.as_slice() else {
            return Err(FaceSegError::model(format!(
                "expected a 4-D NHWC input, model declares {} dimensions",
                dims.len()
            )));
        };

        if *batch != 1 {
            return Err(FaceSegError::model(format!(
                "expected batch size 1, model declares {batch}"
            )));
        }
        if *channels != 3 {
            return Err(FaceSegError::model(format!(
                "expected 3 input channels, model declares {channels}"
            )));
        }
        if height != width || width % 2 != 0 {
            return Err(FaceSegError::model(format!(
                "expected even square spatial input, model declares {height}x{width}"
            )));
        }

        Ok((*batch, *height, *width, *channels))
    }
}

impl InferenceBackend for TractBackend {
    fn input_shape(&self) -> (usize, usize, usize, usize) {
        self.input_shape
    }

    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>> {
        debug!(input_shape = ?input.shape(), "running Tract inference");
        let inference_start = Instant::now();

        let input_tensor = Tensor::from(input.clone());
        let outputs = self
            .model
            .run(tvec![input_tensor.into()])
            .map_err(|e| FaceSegError::inference(format!("Tract inference failed: {e}")))?;

        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| FaceSegError::inference("no output tensor produced"))?
            .into_arc_tensor();

        let output_view = output_tensor.to_array_view::<f32>().map_err(|e| {
            FaceSegError::inference(format!("failed to read output tensor: {e}"))
        })?;

        let shape = output_view.shape();
        if shape.len() != 4 {
            return Err(FaceSegError::inference(format!(
                "expected 4-D output tensor, got {}-D",
                shape.len()
            )));
        }

        let output = Array4::from_shape_vec(
            (shape[0], shape[1], shape[2], shape[3]),
            output_view.to_owned().into_raw_vec_and_offset().0,
        )
        .map_err(|e| FaceSegError::inference(format!("failed to reshape output tensor: {e}")))?;

        debug!(
            output_shape = ?output.shape(),
            inference_ms = inference_start.elapsed().as_millis() as u64,
            "Tract inference completed"
        );

        Ok(output)
    }
}
