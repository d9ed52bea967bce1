//! Command-line entry point for the segmentation server

use crate::backends::TractBackend;
use crate::config::ServiceConfig;
use crate::processor::SegmentationPipeline;
use crate::server;
use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Face composite segmentation server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "faceseg-server")]
pub struct Cli {
    /// Path to the ONNX model file
    #[arg(short, long, value_name = "MODEL", default_value = "model.onnx")]
    pub model: PathBuf,

    /// Address to bind the HTTP server to
    #[arg(short, long, value_name = "ADDR", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Root directory for per-request scratch space (system temp by default)
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Keep per-request scratch directories for debugging
    #[arg(long)]
    pub keep_artifacts: bool,
}

/// Parse arguments, load the model and serve
///
/// Model loading happens before the listener is bound: a missing or
/// malformed model file terminates the process instead of serving traffic.
///
/// # Errors
/// Returns any startup error (configuration, model load, bind failure).
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = ServiceConfig::builder()
        .model_path(cli.model)
        .bind_addr(cli.bind)
        .scratch_dir(cli.scratch_dir)
        .keep_artifacts(cli.keep_artifacts)
        .build()
        .context("invalid service configuration")?;

    let backend = TractBackend::from_path(&config.model_path)
        .with_context(|| format!("failed to load model '{}'", config.model_path.display()))?;

    let bind_addr = config.bind_addr;
    let pipeline = Arc::new(
        SegmentationPipeline::new(config, Arc::new(backend))
            .context("failed to build segmentation pipeline")?,
    );

    server::serve(bind_addr, pipeline)
        .await
        .context("server terminated with an error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["faceseg-server"]);
        assert_eq!(cli.model, PathBuf::from("model.onnx"));
        assert_eq!(cli.bind, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert!(cli.scratch_dir.is_none());
        assert!(!cli.keep_artifacts);
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::parse_from([
            "faceseg-server",
            "--model",
            "/models/faces.onnx",
            "--bind",
            "0.0.0.0:9000",
            "--scratch-dir",
            "/var/tmp/faceseg",
            "--keep-artifacts",
        ]);
        assert_eq!(cli.model, PathBuf::from("/models/faces.onnx"));
        assert_eq!(cli.bind.port(), 9000);
        assert_eq!(cli.scratch_dir, Some(PathBuf::from("/var/tmp/faceseg")));
        assert!(cli.keep_artifacts);
    }
}
