use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised by the core pipeline.
///
/// Most of the pipeline is total: ages clamp, missing fields default to zero.
/// What remains is snapshot decoding and filter configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unrecognized snapshot shape: {0}")]
    UnrecognizedSnapshot(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, CoreError>;
