//! Shared constants for modrank.
//!
//! Defaults for the catalog population and the interactive view live here so
//! the CLI, the server and the tests agree on them.

/// Upstream game identifier the catalog search is scoped to.
pub const DEFAULT_GAME_ID: u32 = 432;

/// Free-text filter sent with every catalog search page.
pub const DEFAULT_SEARCH_FILTER: &str = "create";

/// Page size requested from the upstream catalog.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Category id that qualifies an entry for the population.
pub const DEFAULT_CATEGORY_ID: i64 = 6484;

/// Name prefix (followed by whitespace) that qualifies an entry.
pub const DEFAULT_NAME_PREFIX: &str = "create";

/// Canonical-link patterns that reject an entry outright.
pub const DEFAULT_EXCLUDED_LINK_PATTERNS: &[&str] = &["*/modpacks/*", "*/bukkit-plugins/*"];

/// Number of rows shown when the viewer has not picked a window size.
pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// Minimum row count the grouped chart area is sized for.
pub const GROUPED_MIN_ROWS: usize = 20;

/// Pixel height allotted to each row of the grouped chart.
pub const GROUPED_ROW_HEIGHT_PX: u32 = 30;

/// Fixed pixel height of the proportional chart area.
pub const PROPORTIONAL_AREA_PX: u32 = 600;

/// Per-message character limit for leaderboard notifications.
pub const NOTIFY_MESSAGE_LIMIT: usize = 2000;
