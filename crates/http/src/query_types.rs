//! Request/query types (Deserialize)

use modrank_core::{CoreError, PopulationKind, SortDirection, ViewMode, ViewState};
use serde::Deserialize;

use crate::api_error::ApiError;

/// Upper bound on `max` so one request cannot ask for an unbounded chart.
pub const MAX_CHART_ENTRIES: usize = 1000;

/// Query for `/api/chart`. Every field is optional and falls back to the
/// default view.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub population: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    #[serde(default)]
    pub q: String,
    pub max: Option<usize>,
    pub mode: Option<String>,
}

fn parse_or_bad_request<T>(raw: Option<&str>, default: T) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = CoreError>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map_err(|e: CoreError| ApiError::BadRequest(e.to_string())),
        None => Ok(default),
    }
}

impl ChartQuery {
    /// Build the view state this query describes.
    ///
    /// # Errors
    /// Returns [`ApiError::BadRequest`] for an unknown population, direction
    /// or mode.
    pub fn to_view_state(&self) -> Result<ViewState, ApiError> {
        let defaults = ViewState::default();
        let population: PopulationKind =
            parse_or_bad_request(self.population.as_deref(), defaults.population)?;
        let direction: SortDirection =
            parse_or_bad_request(self.dir.as_deref(), defaults.direction)?;
        let mode: ViewMode = parse_or_bad_request(self.mode.as_deref(), defaults.mode)?;
        let sort_key = self
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or(defaults.sort_key, str::to_owned);
        Ok(ViewState {
            population,
            sort_key,
            direction,
            search: self.q.clone(),
            max_entries: self.max.unwrap_or(defaults.max_entries).clamp(1, MAX_CHART_ENTRIES),
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_default_view() {
        let state = ChartQuery::default().to_view_state().expect("state");
        assert_eq!(state, ViewState::default());
    }

    #[test]
    fn legacy_names_are_accepted() {
        let query = ChartQuery {
            population: Some("authors".to_owned()),
            mode: Some("pie".to_owned()),
            dir: Some("asc".to_owned()),
            max: Some(0),
            ..ChartQuery::default()
        };
        let state = query.to_view_state().expect("state");
        assert_eq!(state.population, PopulationKind::Creators);
        assert_eq!(state.mode, ViewMode::Proportional);
        assert_eq!(state.direction, SortDirection::Ascending);
        assert_eq!(state.max_entries, 1);
    }

    #[test]
    fn unknown_population_is_rejected() {
        let query = ChartQuery { population: Some("players".to_owned()), ..ChartQuery::default() };
        assert!(matches!(query.to_view_state(), Err(ApiError::BadRequest(_))));
    }
}
