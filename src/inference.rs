//! Inference backend abstraction
//!
//! The pipeline talks to the model through this trait so the serving path
//! can run Tract while tests inject stub backends with canned outputs.

use crate::error::Result;
use ndarray::Array4;

/// Trait for inference backends
///
/// Implementations hold the loaded model as immutable, process-wide state;
/// `infer` must be safe to call from concurrent requests.
pub trait InferenceBackend: Send + Sync {
    /// Declared input shape in NHWC order: (batch, height, width, channels)
    fn input_shape(&self) -> (usize, usize, usize, usize);

    /// Run one forward pass in inference mode
    ///
    /// Input is an NHWC tensor of shape `(1, 2S, 2S, 3)`; the output is the
    /// per-pixel prediction tensor of shape `(1, 2S, 2S, 1)`.
    ///
    /// # Errors
    /// - Model execution failures
    /// - Output tensor conversion or shape errors
    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>>;

    /// Side length of one composite tile, derived from the declared input
    /// width (the composite is a 2×2 grid, so one tile is half the width)
    fn tile_side(&self) -> u32 {
        (self.input_shape().2 / 2) as u32
    }
}
