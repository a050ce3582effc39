use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use modrank_core::{RenderedView, render_snapshot};

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::ChartQuery;

/// Rank, filter and lay out a chart on the server.
pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<RenderedView>, ApiError> {
    let view_state = query.to_view_state()?;
    let snapshot = state.store.load_snapshot(view_state.population).await?;
    let view = render_snapshot(&snapshot, &view_state)?;
    tracing::debug!(
        population = %view.population,
        matched = view.matched,
        entries = view.chart.entry_count(),
        "rendered chart"
    );
    Ok(Json(view))
}
