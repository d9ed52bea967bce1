//! HTTP surface
//!
//! One prediction endpoint plus a liveness check, served with axum. The
//! pipeline (and the model inside it) is shared, read-only application
//! state; the hosting runtime decides request concurrency.

pub mod errors;
pub mod handlers;

use crate::error::Result;
use crate::processor::SegmentationPipeline;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::DEFAULT_THRESHOLD;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The request pipeline, holding the loaded model
    pub pipeline: Arc<SegmentationPipeline>,
}

/// Build the service router
#[must_use]
pub fn router(pipeline: Arc<SegmentationPipeline>) -> Router {
    let state = AppState { pipeline };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        // Four image uploads per request; the stock 2 MB body cap is too low.
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped
///
/// # Errors
/// Returns `FaceSegError::Io` when binding or serving fails.
pub async fn serve(addr: SocketAddr, pipeline: Arc<SegmentationPipeline>) -> Result<()> {
    let app = router(pipeline);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "segmentation server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
