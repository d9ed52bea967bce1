//! Service configuration

use crate::error::{FaceSegError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for the segmentation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Path to the serialized ONNX model, loaded once at startup
    pub model_path: PathBuf,

    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,

    /// Root directory for per-request scratch space (`None` = system temp)
    pub scratch_dir: Option<PathBuf>,

    /// Keep per-request scratch directories instead of deleting them
    /// (debugging aid, off by default)
    pub keep_artifacts: bool,
}

impl ServiceConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.onnx"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            scratch_dir: None,
            keep_artifacts: false,
        }
    }
}

/// Builder for `ServiceConfig`
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
        }
    }

    #[must_use]
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = path.into();
        self
    }

    #[must_use]
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    #[must_use]
    pub fn scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.scratch_dir = dir;
        self
    }

    #[must_use]
    pub fn keep_artifacts(mut self, keep: bool) -> Self {
        self.config.keep_artifacts = keep;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `FaceSegError::InvalidConfig` when the model path is empty.
    pub fn build(self) -> Result<ServiceConfig> {
        if self.config.model_path.as_os_str().is_empty() {
            return Err(FaceSegError::invalid_config("model path must not be empty"));
        }
        Ok(self.config)
    }
}
