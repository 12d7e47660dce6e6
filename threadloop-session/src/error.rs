use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Violations of the tool call / tool result pairing rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("tool result at position {index} has no call id to reply to")]
    MissingReplyTarget { index: usize },
    #[error("tool result at position {index} answers '{found}' but '{expected}' is next")]
    UnexpectedReply {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("tool result at position {index} answers unknown call '{call_id}'")]
    OrphanToolResult { index: usize, call_id: String },
}

/// Failures of a checkpoint store.
///
/// "No prior state" is not an error: `load` returns `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("checkpoint I/O failed at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("checkpoint database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("checkpoint for thread '{thread_id}' could not be encoded or decoded: {source}")]
    Serialization {
        thread_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "refusing to save thread '{thread_id}': {stored} stored messages are not a prefix of the new state"
    )]
    NonMonotonic { thread_id: String, stored: usize },
    #[error("checkpoint store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("checkpoint store is unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialization(thread_id: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            thread_id: thread_id.into(),
            source,
        }
    }
}
