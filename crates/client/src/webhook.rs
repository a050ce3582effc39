//! Chat webhook client used by the leaderboard notifier.

use std::time::Duration;

use serde::Serialize;

use crate::error::{ClientError, Result};
use crate::retry::{RetryPolicy, check_status};

const WEBHOOK_URL_ENV: &str = "MODRANK_WEBHOOK_URL";

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// Posts `{"content": ...}` messages to a webhook URL.
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookClient").field("url", &"***").finish_non_exhaustive()
    }
}

impl WebhookClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::ClientInit(e.to_string()))?;
        Ok(Self { client, url, retry: RetryPolicy::default() })
    }

    /// Build from `MODRANK_WEBHOOK_URL`, if set.
    ///
    /// # Errors
    /// See [`WebhookClient::new`].
    pub fn from_env() -> Result<Option<Self>> {
        modrank_core::env_string(WEBHOOK_URL_ENV).map(Self::new).transpose()
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Post one message.
    ///
    /// # Errors
    /// Returns the HTTP error after retries on transient failures.
    pub async fn post_message(&self, content: &str) -> Result<()> {
        let payload = WebhookMessage { content };
        self.retry
            .run("webhook post", || async {
                let response = self.client.post(&self.url).json(&payload).send().await?;
                check_status(response).await?;
                Ok::<(), ClientError>(())
            })
            .await
    }

    /// Post messages one after another, stopping at the first failure.
    ///
    /// # Errors
    /// See [`WebhookClient::post_message`].
    pub async fn post_all(&self, messages: &[String]) -> Result<usize> {
        for (sent, message) in messages.iter().enumerate() {
            if let Err(e) = self.post_message(message).await {
                tracing::warn!(sent, error = %e, "webhook post failed");
                return Err(e);
            }
        }
        Ok(messages.len())
    }
}
