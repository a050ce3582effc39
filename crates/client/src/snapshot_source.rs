//! Snapshot retrieval over HTTP from a running modrank server.

use std::time::Duration;

use modrank_core::{PopulationKind, Snapshot};

use crate::error::{ClientError, Result};
use crate::retry::{RetryPolicy, check_status};

/// Reads snapshots from `{base}/api/items` and `{base}/api/creators`.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpSnapshotSource {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            retry: RetryPolicy::none(),
        })
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and decode the snapshot for `kind`.
    ///
    /// # Errors
    /// Returns [`ClientError::HttpStatus`] for non-success responses and
    /// [`ClientError::Snapshot`] when the body is not a recognizable snapshot.
    pub async fn fetch_snapshot(&self, kind: PopulationKind) -> Result<Snapshot> {
        let url = format!("{}/api/{}", self.base_url, kind.as_str());
        let bytes = self
            .retry
            .run("snapshot fetch", || async {
                let response = self.client.get(&url).send().await?;
                Ok::<_, ClientError>(check_status(response).await?.bytes().await?)
            })
            .await?;
        Ok(Snapshot::from_slice(&bytes)?)
    }
}
