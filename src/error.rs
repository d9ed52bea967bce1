//! Error types for the face segmentation service

use thiserror::Error;

/// Result type alias for face segmentation operations
pub type Result<T> = std::result::Result<T, FaceSegError>;

/// Error taxonomy for the segmentation pipeline and service
///
/// `Model` errors are startup-fatal: the binary propagates them out of main
/// instead of serving traffic. `InvalidInput` maps to a client error at the
/// HTTP boundary, `EmptyMask` to a degenerate-prediction failure after
/// inference has run, and the remaining variants to internal errors.
#[derive(Error, Debug)]
pub enum FaceSegError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Model loading or shape-introspection errors (startup-fatal)
    #[error("Model error: {0}")]
    Model(String),

    /// Forward-pass failures
    #[error("Inference error: {0}")]
    Inference(String),

    /// Malformed or missing client input, rejected before processing
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Thresholding selected no pixels at all
    #[error("no pixels selected at threshold {threshold}; raise the threshold or check the input images")]
    EmptyMask {
        /// The threshold the request was processed with
        threshold: f32,
    },

    /// Pipeline processing errors
    #[error("Processing error: {0}")]
    Processing(String),

    /// Invalid service configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FaceSegError {
    /// Create a new model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new invalid-input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new invalid-configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = FaceSegError::invalid_input("file1 is required");
        assert!(matches!(err, FaceSegError::InvalidInput(_)));

        let err = FaceSegError::model("model.onnx not found");
        assert!(matches!(err, FaceSegError::Model(_)));
    }

    #[test]
    fn test_error_display() {
        let err = FaceSegError::processing("composite decode failed");
        assert_eq!(err.to_string(), "Processing error: composite decode failed");

        let err = FaceSegError::EmptyMask { threshold: -0.5 };
        assert!(err.to_string().contains("-0.5"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FaceSegError = io_err.into();
        assert!(matches!(err, FaceSegError::Io(_)));
    }
}
