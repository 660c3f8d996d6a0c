//! Error types for history reconstruction
//!
//! Only [`HistoryError::InvalidPattern`] ever reaches a caller as a hard
//! error. The other variants are produced by [`crate::git::HistorySource`]
//! implementations and recovered locally: a missing repository or a failed
//! log query becomes an empty history, a missing snapshot skips one revision.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("{} is not inside a git repository", path.display())]
    NotARepository { path: PathBuf },

    #[error("History unavailable: {reason}")]
    HistoryUnavailable { reason: String },

    #[error("{path} does not exist at revision {revision}")]
    SnapshotMissing { revision: String, path: String },

    #[error("Malformed log entry: {line:?}")]
    MalformedLogEntry { line: String },

    #[error("Invalid TODO pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type HistoryResult<T> = Result<T, HistoryError>;

impl HistoryError {
    /// Wrap any backend failure as [`HistoryError::HistoryUnavailable`].
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        HistoryError::HistoryUnavailable {
            reason: reason.to_string(),
        }
    }

    pub fn snapshot_missing(revision: &str, path: &str) -> Self {
        HistoryError::SnapshotMissing {
            revision: revision.to_string(),
            path: path.to_string(),
        }
    }
}
