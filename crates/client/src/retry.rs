//! Bounded retry for transient upstream failures.

use std::future::Future;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Upper bound for the HTTP error body kept in [`ClientError::HttpStatus`].
pub const MAX_ERROR_BODY_LEN: usize = 2000;

/// How many times to retry and how long to wait between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    /// Delay before retry `n` (1-based) is `base_delay * 2^(n-1)`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, base_delay: Duration::from_secs(1) }
    }
}

impl RetryPolicy {
    /// Retry without sleeping between attempts.
    #[must_use]
    pub const fn immediate(max_retries: usize) -> Self {
        Self { max_retries, base_delay: Duration::ZERO }
    }

    /// No retries at all.
    #[must_use]
    pub const fn none() -> Self {
        Self::immediate(0)
    }

    #[must_use]
    pub fn delay_for(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        self.base_delay.saturating_mul(1_u32 << exponent)
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out.
    ///
    /// # Errors
    /// Returns the first non-transient error unchanged, or
    /// [`ClientError::RetriesExhausted`] wrapping the last transient error.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error: Option<ClientError> = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.delay_for(attempt);
                tracing::warn!("{label}: retry attempt {attempt}/{} after {delay:?}", self.max_retries);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => last_error = Some(err),
                Err(err) => return Err(err),
            }
        }
        Err(ClientError::RetriesExhausted(Box::new(
            last_error.unwrap_or_else(|| ClientError::ClientInit(format!("{label}: no attempts"))),
        )))
    }
}

/// Turn a non-success response into [`ClientError::HttpStatus`].
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
    Err(ClientError::HttpStatus {
        code: status.as_u16(),
        body: truncate(&body, MAX_ERROR_BODY_LEN).to_owned(),
    })
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
