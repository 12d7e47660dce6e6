use crate::error::StoreError;
use crate::state::ConversationState;
use crate::store::{Checkpoint, CheckpointMeta, CheckpointStore, ensure_extends};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct ThreadEntry {
    state: Option<ConversationState>,
    history: Vec<CheckpointMeta>,
}

/// In-process checkpoint store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    threads: RwLock<HashMap<String, ThreadEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let threads = self.threads.read().await;
        let checkpoint = threads.get(thread_id).and_then(|entry| {
            let state = entry.state.clone()?;
            let meta = entry.history.last()?.clone();
            Some(Checkpoint { meta, state })
        });
        Ok(checkpoint)
    }

    async fn save(&self, state: &ConversationState) -> Result<CheckpointMeta, StoreError> {
        let mut threads = self.threads.write().await;
        let entry = threads.entry(state.thread_id().to_string()).or_default();
        if let Some(stored) = &entry.state {
            ensure_extends(stored.messages(), state)?;
        }

        let meta = CheckpointMeta::next(entry.history.last(), state);
        entry.state = Some(state.clone());
        entry.history.push(meta.clone());
        debug!(
            thread_id = state.thread_id(),
            version = meta.version,
            messages = meta.message_count,
            "Saved in-memory checkpoint"
        );
        Ok(meta)
    }

    async fn history(&self, thread_id: &str) -> Result<Vec<CheckpointMeta>, StoreError> {
        let threads = self.threads.read().await;
        Ok(threads
            .get(thread_id)
            .map(|entry| entry.history.clone())
            .unwrap_or_default())
    }
}
