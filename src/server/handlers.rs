//! Request handlers

use crate::processor::SLOT_COUNT;
use crate::server::errors::ApiError;
use crate::server::AppState;
use crate::types::UploadedImage;
use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// Documented default for the selection threshold; the parameter itself is
/// mandatory and its absence is rejected, this value only appears in the
/// error message.
pub const DEFAULT_THRESHOLD: f32 = -0.5;

/// Query parameters for `POST /predict`
#[derive(Debug, Deserialize)]
pub struct PredictParams {
    /// Minimal prediction value a pixel must stay below to be selected;
    /// recommended domain -1..1
    #[serde(rename = "minPredictionValue")]
    pub min_prediction_value: Option<f32>,
}

/// GET /health - liveness check
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "tile_side": state.pipeline.tile_side(),
    }))
}

/// POST /predict - segment a composite of up to four face uploads
///
/// Multipart parts `file1` (required) through `file4` (optional), plus the
/// mandatory `minPredictionValue` query parameter. Slots without an upload
/// repeat upload #1. Responds with the RGBA result as PNG.
pub async fn predict(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let threshold = params.min_prediction_value.ok_or_else(|| {
        ApiError::invalid_request(format!(
            "query parameter 'minPredictionValue' is required (typical value {DEFAULT_THRESHOLD}, domain -1..1)"
        ))
    })?;

    let mut slots: [Option<UploadedImage>; SLOT_COUNT] = [None, None, None, None];

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_request(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        let Some(slot) = slot_index(&name) else {
            debug!(part = %name, "ignoring unknown multipart part");
            continue;
        };

        let filename = field.file_name().map(ToString::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::invalid_request(format!("failed to read part '{name}': {e}")))?;
        slots[slot] = Some(UploadedImage::new(bytes.to_vec(), filename));
    }

    // file1 is mandatory; the remaining slots keep upload order and skip gaps.
    if slots[0].is_none() {
        warn!("predict request without file1");
        return Err(ApiError::invalid_request("multipart part 'file1' is required"));
    }
    let uploads: Vec<UploadedImage> = slots.into_iter().flatten().collect();

    debug!(uploads = uploads.len(), threshold, "predict request accepted");

    // The pipeline is synchronous, CPU-bound work; keep it off the async
    // executor threads.
    let pipeline = state.pipeline.clone();
    let png_bytes = tokio::task::spawn_blocking(move || {
        let result = pipeline.process(&uploads, threshold)?;
        result.to_png_bytes()
    })
    .await
    .map_err(|e| ApiError::internal(format!("processing task failed: {e}")))??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes).into_response())
}

/// Map a multipart part name to its slot index
fn slot_index(name: &str) -> Option<usize> {
    match name {
        "file1" => Some(0),
        "file2" => Some(1),
        "file3" => Some(2),
        "file4" => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_index() {
        assert_eq!(slot_index("file1"), Some(0));
        assert_eq!(slot_index("file4"), Some(3));
        assert_eq!(slot_index("file5"), None);
        assert_eq!(slot_index("threshold"), None);
    }
}
