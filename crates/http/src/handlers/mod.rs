pub mod chart;
pub mod snapshots;
