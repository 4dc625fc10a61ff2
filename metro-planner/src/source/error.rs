//! Schedule source error types.

use std::path::PathBuf;

/// Errors that can occur when reading schedule records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Reading the backing file failed
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid feed snapshot
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backing store could not answer the query
    #[error("schedule source unavailable: {0}")]
    Unavailable(String),
}
