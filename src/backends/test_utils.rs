//! Stub backend for testing the pipeline without a model file

use crate::error::Result;
use crate::inference::InferenceBackend;
use ndarray::Array4;

/// Backend that emits a constant prediction value for every pixel
#[derive(Debug, Clone)]
pub struct StubBackend {
    input_shape: (usize, usize, usize, usize),
    output_value: f32,
}

impl StubBackend {
    /// Stub with a given composite side (2S) and constant output value
    #[must_use]
    pub fn new(composite_side: usize, output_value: f32) -> Self {
        Self {
            input_shape: (1, composite_side, composite_side, 3),
            output_value,
        }
    }
}

impl InferenceBackend for StubBackend {
    fn input_shape(&self) -> (usize, usize, usize, usize) {
        self.input_shape
    }

    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>> {
        let shape = input.shape();
        Ok(Array4::from_elem(
            (shape[0], shape[1], shape[2], 1),
            self.output_value,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_shapes() {
        let stub = StubBackend::new(512, -1.0);
        assert_eq!(stub.input_shape(), (1, 512, 512, 3));
        assert_eq!(stub.tile_side(), 256);

        let input = Array4::<f32>::zeros((1, 512, 512, 3));
        let output = stub.infer(&input).unwrap();
        assert_eq!(output.shape(), &[1, 512, 512, 1]);
        assert!((output[[0, 0, 0, 0]] - (-1.0)).abs() < f32::EPSILON);
    }
}
