use anyhow::{Context, Result};
use chrono::Utc;
use modrank_client::{CatalogClient, CatalogConfig};
use modrank_core::FilterConfig;
use modrank_service::{Refresher, SnapshotStore};

fn catalog_client(max_results: Option<usize>) -> Result<CatalogClient> {
    let mut config = CatalogConfig::from_env().context("catalog settings")?;
    if let Some(max) = max_results {
        config.max_results = (max > 0).then_some(max);
    }
    CatalogClient::new(config).context("failed to build catalog client")
}

fn refresher(store: SnapshotStore) -> Result<Refresher> {
    Refresher::new(store, &FilterConfig::from_env()).context("invalid filter settings")
}

pub(crate) async fn run_fetch(store: SnapshotStore, max_results: Option<usize>) -> Result<()> {
    let client = catalog_client(max_results)?;
    let refresher = refresher(store)?;
    let config = client.config();
    let count = refresher
        .fetch(&client, config.page_size, config.max_results)
        .await
        .context("catalog fetch failed")?;
    println!("Fetched {count} entries into {}", refresher.store().raw_catalog_path().display());
    Ok(())
}

pub(crate) async fn run_process(store: SnapshotStore) -> Result<()> {
    let report = refresher(store)?.process(Utc::now()).await.context("processing failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) async fn run_refresh(store: SnapshotStore, max_results: Option<usize>) -> Result<()> {
    let client = catalog_client(max_results)?;
    let refresher = refresher(store)?;
    let config = client.config();
    let report = refresher
        .refresh(&client, config.page_size, config.max_results, Utc::now())
        .await
        .context("refresh failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
