//! Interactive dashboard session.
//!
//! A [`Dashboard`] owns the current [`ViewState`], a per-kind snapshot cache
//! and a single [`ChartSurface`]. Every dispatch is stamped with a request
//! generation; a render only commits when its generation is still the latest
//! issued, so a slow retrieval can never overwrite a newer view.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use modrank_client::HttpSnapshotSource;
use modrank_core::{
    ChartSurface, PopulationKind, RenderedView, Snapshot, SurfaceContent, ViewAction, ViewState,
    render_snapshot,
};

use crate::error::SnapshotError;
use crate::store::{SnapshotStore, expect_kind};

/// Where a dashboard reads snapshots from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load(&self, kind: PopulationKind) -> Result<Snapshot, SnapshotError>;
}

#[async_trait]
impl SnapshotSource for SnapshotStore {
    async fn load(&self, kind: PopulationKind) -> Result<Snapshot, SnapshotError> {
        self.load_snapshot(kind).await
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn load(&self, kind: PopulationKind) -> Result<Snapshot, SnapshotError> {
        expect_kind(self.fetch_snapshot(kind).await?, kind)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Session-scoped memo of successfully loaded snapshots.
///
/// Failures are not cached, so the next request for the same kind retries.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    loaded: Mutex<HashMap<PopulationKind, Arc<Snapshot>>>,
}

impl SnapshotCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, kind: PopulationKind) -> Option<Arc<Snapshot>> {
        lock(&self.loaded).get(&kind).cloned()
    }

    /// Cached snapshot for `kind`, loading it from `source` on a miss.
    ///
    /// # Errors
    /// Propagates the source's error without caching it.
    pub async fn get_or_load<S>(
        &self,
        source: &S,
        kind: PopulationKind,
    ) -> Result<Arc<Snapshot>, SnapshotError>
    where
        S: SnapshotSource + ?Sized,
    {
        if let Some(hit) = self.get(kind) {
            return Ok(hit);
        }
        let snapshot = Arc::new(source.load(kind).await?);
        let mut loaded = lock(&self.loaded);
        Ok(Arc::clone(loaded.entry(kind).or_insert(snapshot)))
    }

    /// Drop everything, forcing the next request to reload.
    pub fn clear(&self) {
        lock(&self.loaded).clear();
    }
}

/// Monotonic request generation counter.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { latest: AtomicU64::new(0) }
    }

    /// Stamp a new request. Every earlier generation becomes stale.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst).saturating_add(1)
    }

    #[must_use]
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.latest() == generation
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The view was mounted as chart `instance`.
    Rendered { generation: u64, instance: u64, view: RenderedView },
    /// Retrieval or rendering failed; the surface shows the failure.
    NoData { generation: u64, reason: String },
    /// A newer request was issued while this one was in flight.
    Superseded { generation: u64 },
}

impl RenderOutcome {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        match *self {
            Self::Rendered { generation, .. }
            | Self::NoData { generation, .. }
            | Self::Superseded { generation } => generation,
        }
    }
}

pub struct Dashboard<S> {
    source: S,
    cache: SnapshotCache,
    tracker: RequestTracker,
    state: Mutex<ViewState>,
    surface: Mutex<ChartSurface>,
}

impl<S: SnapshotSource> Dashboard<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_state(source, ViewState::default())
    }

    #[must_use]
    pub fn with_state(source: S, state: ViewState) -> Self {
        Self {
            source,
            cache: SnapshotCache::new(),
            tracker: RequestTracker::new(),
            state: Mutex::new(state),
            surface: Mutex::new(ChartSurface::new()),
        }
    }

    #[must_use]
    pub fn state(&self) -> ViewState {
        lock(&self.state).clone()
    }

    #[must_use]
    pub fn surface_content(&self) -> SurfaceContent {
        lock(&self.surface).content().clone()
    }

    #[must_use]
    pub fn live_charts(&self) -> u64 {
        lock(&self.surface).live_instances()
    }

    #[must_use]
    pub const fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Apply `action` to the current state and render the result.
    pub async fn dispatch(&self, action: ViewAction) -> RenderOutcome {
        let (state, generation) = {
            let mut current = lock(&self.state);
            let next = current.clone().apply(action);
            *current = next.clone();
            (next, self.tracker.issue())
        };
        self.render(state, generation).await
    }

    /// Re-render the current state without changing it.
    pub async fn refresh(&self) -> RenderOutcome {
        let (state, generation) = {
            let current = lock(&self.state);
            (current.clone(), self.tracker.issue())
        };
        self.render(state, generation).await
    }

    async fn render(&self, state: ViewState, generation: u64) -> RenderOutcome {
        let loaded = self.cache.get_or_load(&self.source, state.population).await;

        if !self.tracker.is_current(generation) {
            tracing::debug!(generation, latest = self.tracker.latest(), "dropping stale render");
            return RenderOutcome::Superseded { generation };
        }

        let rendered = match loaded {
            Ok(snapshot) => render_snapshot(&snapshot, &state).map_err(|e| e.to_string()),
            Err(e) => {
                tracing::warn!(population = %state.population, error = %e, "snapshot unavailable");
                Err(e.to_string())
            },
        };

        let mut surface = lock(&self.surface);
        // Re-check under the surface lock: a newer render may have committed meanwhile.
        if !self.tracker.is_current(generation) {
            tracing::debug!(generation, "dropping stale render");
            return RenderOutcome::Superseded { generation };
        }
        match rendered {
            Ok(view) => {
                let instance = surface.mount(view.chart.clone());
                RenderOutcome::Rendered { generation, instance, view }
            },
            Err(reason) => {
                surface.show_failure(reason.clone());
                RenderOutcome::NoData { generation, reason }
            },
        }
    }
}
