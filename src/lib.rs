#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_errors_doc)]

//! # Face Composite Segmentation Service
//!
//! HTTP service that accepts up to four face images, composites them into a
//! 2×2 grid, runs a pre-trained image-to-image model over the composite with
//! a pure-Rust Tract backend, and returns an RGBA PNG whose alpha channel
//! marks pixels whose prediction fell below a caller-supplied threshold.
//!
//! Pipeline stages, in order:
//!
//! 1. **Normalize** every upload to an S×S white-padded tile, where S is
//!    half the model's declared input width ([`utils::normalize_to_tile`])
//! 2. **Composite** the four tiles into a (2S)×(2S) grid
//!    ([`utils::compose_tiles`]); missing slots repeat upload #1
//! 3. **Infer** over the `v/127.5 - 1` normalized NHWC tensor
//!    ([`inference::InferenceBackend`], [`backends::TractBackend`])
//! 4. **Extract** the binary alpha mask with strict less-than threshold
//!    semantics ([`mask::extract_mask`])
//!
//! The model loads once at startup and is shared read-only across requests;
//! everything else is request-scoped, including a UUID-named scratch
//! directory that is removed on every exit path.
//!
//! ## Example
//!
//! ```rust,no_run
//! use faceseg::{ServiceConfig, SegmentationPipeline, TractBackend};
//! use std::sync::Arc;
//!
//! # async fn example() -> faceseg::Result<()> {
//! let config = ServiceConfig::builder()
//!     .model_path("/models/faces.onnx")
//!     .build()?;
//! let backend = TractBackend::from_path(&config.model_path)?;
//! let bind_addr = config.bind_addr;
//! let pipeline = Arc::new(SegmentationPipeline::new(config, Arc::new(backend))?);
//! faceseg::server::serve(bind_addr, pipeline).await?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod mask;
pub mod processor;
pub mod server;
pub mod types;
pub mod utils;

pub use backends::TractBackend;
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{FaceSegError, Result};
pub use inference::InferenceBackend;
pub use mask::{extract_mask, MaskOutcome};
pub use processor::{SegmentationPipeline, SLOT_COUNT};
pub use server::{router, serve, ApiError, ErrorResponse, DEFAULT_THRESHOLD};
pub use types::{PredictionResult, ProcessingTimings, UploadedImage};
pub use utils::{compose_tiles, image_to_tensor, normalize_to_tile};
