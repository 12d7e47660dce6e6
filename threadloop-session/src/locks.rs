use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-thread mutual exclusion.
///
/// Each thread id maps to its own async mutex; unrelated threads never
/// contend. Entries nobody holds are pruned on the next acquisition.
#[derive(Debug, Default)]
pub struct ThreadLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

pub type ThreadGuard = OwnedMutexGuard<()>;

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the thread is free.
    pub async fn lock(&self, thread_id: &str) -> ThreadGuard {
        self.slot(thread_id).lock_owned().await
    }

    /// Returns `None` when another task holds the thread.
    pub fn try_lock(&self, thread_id: &str) -> Option<ThreadGuard> {
        self.slot(thread_id).try_lock_owned().ok()
    }

    fn slot(&self, thread_id: &str) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|id, slot| id == thread_id || Arc::strong_count(slot) > 1);
        Arc::clone(slots.entry(thread_id.to_string()).or_default())
    }
}
