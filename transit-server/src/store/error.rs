//! Data store error types.

use std::path::PathBuf;

/// Errors raised while reading network data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Snapshot file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is not valid JSON or has the wrong shape
    #[error("failed to parse snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Backing store could not answer the query
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
