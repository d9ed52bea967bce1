//! Inference backend implementations
//!
//! The service runs on Tract (pure Rust, no external runtime). Tests use the
//! stub backend in `test_utils`.

pub mod tract;

// Test utilities for backend and pipeline testing
#[cfg(test)]
pub mod test_utils;

pub use self::tract::TractBackend;
