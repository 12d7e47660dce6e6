use crate::error::StoreError;
use crate::message::Message;
use crate::state::ConversationState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing one saved snapshot of a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub thread_id: String,
    pub version: u64,
    pub message_count: usize,
    pub saved_at: DateTime<Utc>,
}

impl CheckpointMeta {
    /// Metadata for the snapshot that follows `previous`.
    pub fn next(previous: Option<&CheckpointMeta>, state: &ConversationState) -> Self {
        Self {
            thread_id: state.thread_id().to_string(),
            version: previous.map_or(1, |meta| meta.version + 1),
            message_count: state.len(),
            saved_at: Utc::now(),
        }
    }
}

/// The latest snapshot of a thread together with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub meta: CheckpointMeta,
    pub state: ConversationState,
}

/// Durable storage for conversation threads.
///
/// `load` distinguishes a thread that was never saved (`Ok(None)`) from a
/// store that cannot be read (`Err`). `save` only accepts states that extend
/// the stored history.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>, StoreError>;

    async fn save(&self, state: &ConversationState) -> Result<CheckpointMeta, StoreError>;

    /// All checkpoint metadata for a thread, oldest first.
    async fn history(&self, thread_id: &str) -> Result<Vec<CheckpointMeta>, StoreError>;
}

pub(crate) fn ensure_extends(
    stored: &[Message],
    state: &ConversationState,
) -> Result<(), StoreError> {
    if state.extends(stored) {
        Ok(())
    } else {
        Err(StoreError::NonMonotonic {
            thread_id: state.thread_id().to_string(),
            stored: stored.len(),
        })
    }
}
