use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use modrank_core::PopulationKind;

use crate::AppState;
use crate::api_error::ApiError;

async fn serve_snapshot(state: &AppState, kind: PopulationKind) -> Result<Response, ApiError> {
    let bytes = state.store.read_snapshot_bytes(kind).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}

/// Items snapshot, served byte-for-byte as written by the batch run.
pub async fn get_items(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    serve_snapshot(&state, PopulationKind::Items).await
}

/// Creators snapshot, served byte-for-byte as written by the batch run.
pub async fn get_creators(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    serve_snapshot(&state, PopulationKind::Creators).await
}
