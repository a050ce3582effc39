use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use super::raw::RawCatalogEntry;
use crate::constants::{DEFAULT_CATEGORY_ID, DEFAULT_EXCLUDED_LINK_PATTERNS, DEFAULT_NAME_PREFIX};
use crate::env_config::{env_list, env_parse_with_default, env_string};
use crate::error::{CoreError, Result};

const CATEGORY_ID_ENV: &str = "MODRANK_CATEGORY_ID";
const NAME_PREFIX_ENV: &str = "MODRANK_NAME_PREFIX";
const EXCLUDED_LINKS_ENV: &str = "MODRANK_EXCLUDED_LINKS";

/// Settings deciding which catalog entries belong to the population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub category_id: i64,
    pub name_prefix: String,
    pub excluded_link_patterns: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            category_id: DEFAULT_CATEGORY_ID,
            name_prefix: DEFAULT_NAME_PREFIX.to_owned(),
            excluded_link_patterns: DEFAULT_EXCLUDED_LINK_PATTERNS
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
        }
    }
}

impl FilterConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            category_id: env_parse_with_default(CATEGORY_ID_ENV, defaults.category_id),
            name_prefix: env_string(NAME_PREFIX_ENV).unwrap_or(defaults.name_prefix),
            excluded_link_patterns: env_list(EXCLUDED_LINKS_ENV)
                .unwrap_or(defaults.excluded_link_patterns),
        }
    }
}

/// Compiled population filter.
///
/// An entry is rejected when its canonical link matches an excluded pattern.
/// Otherwise it is kept when it carries the qualifying category OR its name
/// starts with the qualifying prefix followed by whitespace.
#[derive(Debug, Clone)]
pub struct CatalogFilter {
    category_id: i64,
    name_pattern: Regex,
    excluded_links: GlobSet,
}

impl CatalogFilter {
    /// # Errors
    /// Returns [`CoreError::InvalidPattern`] if an exclusion glob does not compile.
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let prefix = config.name_prefix.trim().to_lowercase();
        let name_source = format!(r"^{}\s", regex::escape(&prefix));
        let name_pattern = Regex::new(&name_source).map_err(|e| CoreError::InvalidPattern {
            pattern: name_source.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = GlobSetBuilder::new();
        for pattern in &config.excluded_link_patterns {
            let glob = Glob::new(pattern).map_err(|e| CoreError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
        }
        let excluded_links = builder.build().map_err(|e| CoreError::InvalidPattern {
            pattern: config.excluded_link_patterns.join(","),
            reason: e.to_string(),
        })?;

        Ok(Self { category_id: config.category_id, name_pattern, excluded_links })
    }

    #[must_use]
    pub fn accepts(&self, entry: &RawCatalogEntry) -> bool {
        if entry.website_url().is_some_and(|url| self.excluded_links.is_match(url)) {
            return false;
        }
        self.has_category(entry) || self.has_name_prefix(entry)
    }

    fn has_category(&self, entry: &RawCatalogEntry) -> bool {
        entry.category_ids().contains(&self.category_id)
    }

    fn has_name_prefix(&self, entry: &RawCatalogEntry) -> bool {
        entry.name().is_some_and(|name| self.name_pattern.is_match(&name.trim().to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter() -> CatalogFilter {
        CatalogFilter::new(&FilterConfig::default()).expect("default filter")
    }

    fn entry(value: serde_json::Value) -> RawCatalogEntry {
        RawCatalogEntry(value)
    }

    #[test]
    fn accepts_by_category_alone() {
        assert!(filter().accepts(&entry(json!({"name": "Trains", "categories": [{"id": 6484}]}))));
    }

    #[test]
    fn accepts_by_name_prefix_alone() {
        assert!(filter().accepts(&entry(json!({"name": "  CREATE Deco"}))));
        assert!(filter().accepts(&entry(json!({"name": "Create\tCrafts & Additions"}))));
    }

    #[test]
    fn colon_after_prefix_is_not_whitespace() {
        assert!(!filter().accepts(&entry(json!({"name": "Create: Big Cannons"}))));
    }

    #[test]
    fn prefix_requires_trailing_whitespace() {
        assert!(!filter().accepts(&entry(json!({"name": "Create"}))));
        assert!(!filter().accepts(&entry(json!({"name": "Createaddition"}))));
        assert!(!filter().accepts(&entry(json!({"name": "My Create Addon"}))));
    }

    #[test]
    fn rejects_excluded_links_even_when_qualifying() {
        let pack = entry(json!({
            "name": "Create Above and Beyond",
            "categories": [{"id": 6484}],
            "links": {"websiteUrl": "https://www.example.com/minecraft/modpacks/create-above"}
        }));
        assert!(!filter().accepts(&pack));

        let plugin = entry(json!({
            "name": "Create Plugin",
            "links": {"websiteUrl": "https://www.example.com/minecraft/bukkit-plugins/x"}
        }));
        assert!(!filter().accepts(&plugin));
    }

    #[test]
    fn rejects_unrelated_entries() {
        assert!(!filter().accepts(&entry(json!({"name": "JEI", "categories": [{"id": 1}]}))));
        assert!(!filter().accepts(&entry(json!({}))));
    }

    #[test]
    fn custom_prefix_is_escaped() {
        let config = FilterConfig { name_prefix: "c++".to_owned(), ..FilterConfig::default() };
        let filter = CatalogFilter::new(&config).expect("filter");
        assert!(filter.accepts(&entry(json!({"name": "C++ Tools"}))));
    }

    #[test]
    fn invalid_glob_is_reported() {
        let config = FilterConfig {
            excluded_link_patterns: vec!["[".to_owned()],
            ..FilterConfig::default()
        };
        assert!(matches!(CatalogFilter::new(&config), Err(CoreError::InvalidPattern { .. })));
    }
}
