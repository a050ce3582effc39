//! Service layer for modrank
//!
//! Sits between the CLI/HTTP front ends and the core pipeline: snapshot
//! storage, the offline refresh run, dashboard sessions and leaderboard
//! notifications.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod dashboard;
mod error;
mod leaderboard;
mod refresh;
mod store;

pub use dashboard::{Dashboard, RenderOutcome, RequestTracker, SnapshotCache, SnapshotSource};
pub use error::{NotifyError, RefreshError, SnapshotError};
pub use leaderboard::{
    DEFAULT_TOP_N, Standing, chunk_lines, format_leaderboard, notify, standing,
};
pub use refresh::{RefreshReport, Refresher, build_snapshots};
pub use store::{
    DEFAULT_DATA_DIR, RAW_CATALOG_FILE, SnapshotStore, legacy_snapshot_file_name,
    snapshot_file_name,
};
