//! Upstream catalog search client and pagination.

use std::time::Duration;

use async_trait::async_trait;
use modrank_core::{
    DEFAULT_GAME_ID, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_FILTER, RawCatalogEntry,
    env_parse_with_default, env_string,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::retry::{RetryPolicy, check_status, truncate};

/// Default upstream API root.
pub const DEFAULT_API_URL: &str = "https://api.curseforge.com";

const API_KEY_ENV: &str = "MODRANK_API_KEY";
const LEGACY_API_KEY_ENV: &str = "CURSEFORGE_TOKEN";
const API_URL_ENV: &str = "MODRANK_API_URL";
const GAME_ID_ENV: &str = "MODRANK_GAME_ID";
const SEARCH_FILTER_ENV: &str = "MODRANK_SEARCH_FILTER";
const PAGE_SIZE_ENV: &str = "MODRANK_PAGE_SIZE";
const MAX_RESULTS_ENV: &str = "MODRANK_MAX_RESULTS";

/// Upstream search settings.
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub api_url: String,
    pub api_key: String,
    pub game_id: u32,
    pub search_filter: String,
    pub page_size: usize,
    /// Stop after this many entries. `None` fetches everything.
    pub max_results: Option<usize>,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"***")
            .field("game_id", &self.game_id)
            .field("search_filter", &self.search_filter)
            .field("page_size", &self.page_size)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl CatalogConfig {
    /// Defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            api_key,
            game_id: DEFAULT_GAME_ID,
            search_filter: DEFAULT_SEARCH_FILTER.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            max_results: None,
        }
    }

    /// Read settings from `MODRANK_*` environment variables.
    ///
    /// # Errors
    /// Returns [`ClientError::MissingApiKey`] when neither `MODRANK_API_KEY`
    /// nor `CURSEFORGE_TOKEN` is set.
    pub fn from_env() -> Result<Self> {
        let api_key = env_string(API_KEY_ENV)
            .or_else(|| env_string(LEGACY_API_KEY_ENV))
            .ok_or(ClientError::MissingApiKey)?;
        let defaults = Self::new(api_key);
        let max_results: usize = env_parse_with_default(MAX_RESULTS_ENV, 0);
        Ok(Self {
            api_url: env_string(API_URL_ENV).unwrap_or(defaults.api_url),
            game_id: env_parse_with_default(GAME_ID_ENV, defaults.game_id),
            search_filter: env_string(SEARCH_FILTER_ENV).unwrap_or(defaults.search_filter),
            page_size: env_parse_with_default(PAGE_SIZE_ENV, defaults.page_size).max(1),
            max_results: (max_results > 0).then_some(max_results),
            api_key: defaults.api_key,
        })
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogPage {
    pub entries: Vec<RawCatalogEntry>,
    /// Total reported by the upstream. Only the first page's value is used.
    pub total_count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    #[serde(default)]
    total_count: usize,
}

/// Anything that can serve catalog search pages.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the page starting at offset `index`.
    async fn search_page(&self, index: usize, page_size: usize) -> Result<CatalogPage>;
}

/// Fetch every page from `source`.
///
/// Stops once the number fetched reaches the total reported on the first
/// page, when a page comes back empty, or at `max_results`.
///
/// # Errors
/// Propagates the first page error. Nothing fetched so far is returned.
pub async fn fetch_all<S>(
    source: &S,
    page_size: usize,
    max_results: Option<usize>,
) -> Result<Vec<RawCatalogEntry>>
where
    S: CatalogSource + ?Sized,
{
    let page_size = page_size.max(1);
    let mut entries: Vec<RawCatalogEntry> = Vec::new();
    let mut index = 0_usize;
    let mut total = 0_usize;

    loop {
        tracing::info!(index, "fetching catalog page");
        let page = source.search_page(index, page_size).await?;
        if index == 0 {
            total = page.total_count;
        }
        if page.entries.is_empty() {
            tracing::debug!(index, "empty page, stopping");
            break;
        }
        entries.extend(page.entries);
        index = index.saturating_add(page_size);

        if let Some(cap) = max_results.filter(|cap| entries.len() >= *cap) {
            entries.truncate(cap);
            break;
        }
        if entries.len() >= total {
            break;
        }
    }

    tracing::info!(fetched = entries.len(), total, "catalog fetch complete");
    Ok(entries)
}

/// Client for the upstream search API.
pub struct CatalogClient {
    client: reqwest::Client,
    config: CatalogConfig,
    retry: RetryPolicy,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(mut config: CatalogConfig) -> Result<Self> {
        config.api_url = config.api_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ClientError::ClientInit(e.to_string()))?;
        Ok(Self { client, config, retry: RetryPolicy::default() })
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Fetch the whole catalog with the configured page size and cap.
    ///
    /// # Errors
    /// See [`fetch_all`].
    pub async fn fetch_catalog(&self) -> Result<Vec<RawCatalogEntry>> {
        fetch_all(self, self.config.page_size, self.config.max_results).await
    }

    async fn request_page(&self, index: usize, page_size: usize) -> Result<CatalogPage> {
        let response = self
            .client
            .get(format!("{}/v1/mods/search", self.config.api_url))
            .header("Accept", "application/json")
            .header("x-api-key", &self.config.api_key)
            .query(&[
                ("gameId", self.config.game_id.to_string()),
                ("searchFilter", self.config.search_filter.clone()),
                ("index", index.to_string()),
                ("pageSize", page_size.to_string()),
            ])
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::JsonParse {
                context: format!("catalog search page {index} (body: {})", truncate(&body, 200)),
                source: e,
            })?;
        Ok(CatalogPage {
            entries: parsed.data.into_iter().map(RawCatalogEntry::from).collect(),
            total_count: parsed.pagination.map_or(0, |p| p.total_count),
        })
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn search_page(&self, index: usize, page_size: usize) -> Result<CatalogPage> {
        self.retry.run("catalog search", || self.request_page(index, page_size)).await
    }
}
