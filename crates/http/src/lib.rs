//! HTTP API server for modrank.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]

pub mod api_error;
mod handlers;
mod query_types;

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use modrank_service::SnapshotStore;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub use query_types::{ChartQuery, MAX_CHART_ENTRIES};

/// Shared application state for all HTTP handlers.
pub struct AppState {
    /// Where snapshots are read from.
    pub store: SnapshotStore,
    /// Static files served for every non-API path, if set.
    pub public_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let public_dir = state.public_dir.clone();
    let router = Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/items", get(handlers::snapshots::get_items))
        .route("/api/items.json", get(handlers::snapshots::get_items))
        .route("/api/mods", get(handlers::snapshots::get_items))
        .route("/api/mods.json", get(handlers::snapshots::get_items))
        .route("/api/creators", get(handlers::snapshots::get_creators))
        .route("/api/creators.json", get(handlers::snapshots::get_creators))
        .route("/api/authors", get(handlers::snapshots::get_creators))
        .route("/api/authors.json", get(handlers::snapshots::get_creators))
        .route("/api/chart", get(handlers::chart::get_chart))
        .layer(CorsLayer::permissive())
        .with_state(state);

    match public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
