use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use modrank_http::{AppState, create_router};
use modrank_service::SnapshotStore;

pub(crate) async fn run(
    store: SnapshotStore,
    port: u16,
    host: String,
    public_dir: PathBuf,
) -> Result<()> {
    let public_dir = if public_dir.is_dir() {
        Some(public_dir)
    } else {
        tracing::info!(path = %public_dir.display(), "public dir not found, static viewer disabled");
        None
    };
    tracing::info!(data_dir = %store.data_dir().display(), "serving snapshots");

    let router = create_router(Arc::new(AppState { store, public_dir }));
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Starting HTTP server on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}
