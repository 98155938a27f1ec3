use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use serde::Deserialize;
use services::services::{
    categories::{Category, validate_categories},
    progress::{self, encode_line},
};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::{AppState, error::ApiError};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

#[derive(Debug, Default, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

fn parse_request(body: &[u8]) -> Result<BatchRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BatchRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid batch request: {}", e)))
}

/// Start a run and stream every task snapshot as one JSON line. The run is
/// detached from the request: a client that goes away does not stop it.
pub async fn start_batch(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request = parse_request(&body)?;
    let categories = request
        .categories
        .unwrap_or_else(|| state.categories().to_vec());
    validate_categories(&categories)?;

    let (tx, rx) = progress::channel();
    let pipeline = state.pipeline();
    tokio::spawn(async move {
        if let Err(e) = pipeline.run(&categories, tx).await {
            tracing::error!("[BATCH] Run rejected: {}", e);
        }
    });

    let lines = UnboundedReceiverStream::new(rx).map(|task| encode_line(&task));
    Ok(([(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)], Body::from_stream(lines)).into_response())
}
