//! Core types and pipeline for modrank
//!
//! Everything here is synchronous and free of I/O: catalog normalization,
//! creator aggregation, ranking, view filtering, series building and chart
//! presentation. Retrieval and serving live in the outer crates.

mod age;
mod aggregate;
mod chart;
mod constants;
mod env_config;
mod error;
mod normalize;
mod pipeline;
mod rank;
mod record;
mod series;
mod snapshot;
mod view_filter;
mod view_state;

pub use age::*;
pub use aggregate::*;
pub use chart::*;
pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use normalize::*;
pub use pipeline::*;
pub use rank::*;
pub use record::*;
pub use series::*;
pub use snapshot::*;
pub use view_filter::*;
pub use view_state::*;
