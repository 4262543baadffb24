use std::result::Result as StdResult;

use thiserror::Error;

/// Result type for arbor operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
///
/// Layout and hashing never fail on malformed input; the variants here cover
/// collaborator failures, which the pipeline passes through untouched.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("measure: {0}")]
    /// A content measurer failed.
    Measure(String),
    #[error("paint: {0}")]
    /// A drawing backend failed to paint a node.
    Paint(String),
    #[error("backend: {0}")]
    /// A drawing backend failed outside of painting (clip, clear).
    Backend(String),
    #[error("json: {0}")]
    /// Serialization of a dump or configuration failed.
    Json(String),
    #[error("internal: {0}")]
    /// Internal error.
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
