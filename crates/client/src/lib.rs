//! HTTP clients for modrank: upstream catalog search, snapshot retrieval and
//! notification webhooks.

mod catalog;
mod error;
mod retry;
mod snapshot_source;
mod webhook;

pub use catalog::{
    CatalogClient, CatalogConfig, CatalogPage, CatalogSource, DEFAULT_API_URL, fetch_all,
};
pub use error::{ClientError, Result};
pub use retry::{RetryPolicy, truncate};
pub use snapshot_source::HttpSnapshotSource;
pub use webhook::WebhookClient;
