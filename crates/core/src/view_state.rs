//! Interactive view state.
//!
//! [`ViewState`] is an immutable value. Each user action produces a new state
//! through [`ViewState::apply`]; nothing mutates a shared state in place.

use serde::{Deserialize, Serialize};

use crate::chart::ViewMode;
use crate::constants::DEFAULT_MAX_ENTRIES;
use crate::rank::{DEFAULT_SORT_KEY, SortDirection};
use crate::snapshot::PopulationKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub population: PopulationKind,
    pub sort_key: String,
    pub direction: SortDirection,
    pub search: String,
    /// Requested window size; clamped against the filtered population on use.
    pub max_entries: usize,
    pub mode: ViewMode,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            population: PopulationKind::Items,
            sort_key: DEFAULT_SORT_KEY.to_owned(),
            direction: SortDirection::Descending,
            search: String::new(),
            max_entries: DEFAULT_MAX_ENTRIES,
            mode: ViewMode::Grouped,
        }
    }
}

/// A user action on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    SelectPopulation(PopulationKind),
    /// Selecting the active key flips direction; a new key starts descending.
    Sort(String),
    Search(String),
    SetMaxEntries(usize),
    ToggleMode,
}

impl ViewState {
    #[must_use]
    pub fn apply(self, action: ViewAction) -> Self {
        match action {
            ViewAction::SelectPopulation(population) => Self { population, ..self },
            ViewAction::Sort(key) if key == self.sort_key => {
                Self { direction: self.direction.toggled(), ..self }
            },
            ViewAction::Sort(sort_key) => {
                Self { sort_key, direction: SortDirection::Descending, ..self }
            },
            ViewAction::Search(search) => Self { search, ..self },
            ViewAction::SetMaxEntries(max_entries) => {
                Self { max_entries: max_entries.max(1), ..self }
            },
            ViewAction::ToggleMode => Self { mode: self.mode.toggled(), ..self },
        }
    }
}
