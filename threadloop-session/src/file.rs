use crate::error::StoreError;
use crate::locks::ThreadLocks;
use crate::message::Message;
use crate::state::ConversationState;
use crate::store::{Checkpoint, CheckpointMeta, CheckpointStore, ensure_extends};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct ThreadDocument {
    thread_id: String,
    messages: Vec<Message>,
    #[serde(default)]
    history: Vec<CheckpointMeta>,
}

/// Stores each thread as a JSON document inside a directory.
///
/// File names are the hex encoding of the thread id, so arbitrary ids are
/// safe to use. Writes go to a temporary file that is renamed into place.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    locks: ThreadLocks,
}

impl FileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::io(&dir, source))?;
        Ok(Self {
            dir,
            locks: ThreadLocks::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, thread_id: &str) -> PathBuf {
        let mut name = String::with_capacity(thread_id.len() * 2 + 5);
        for byte in thread_id.bytes() {
            let _ = write!(name, "{byte:02x}");
        }
        name.push_str(".json");
        self.dir.join(name)
    }

    async fn read_document(&self, thread_id: &str) -> Result<Option<ThreadDocument>, StoreError> {
        let path = self.path_for(thread_id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::io(path, source)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::serialization(thread_id, source))
    }
}

#[async_trait]
impl CheckpointStore for FileStore {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let Some(document) = self.read_document(thread_id).await? else {
            return Ok(None);
        };
        let Some(meta) = document.history.last().cloned() else {
            return Ok(None);
        };
        Ok(Some(Checkpoint {
            meta,
            state: ConversationState::restore(document.thread_id, document.messages),
        }))
    }

    async fn save(&self, state: &ConversationState) -> Result<CheckpointMeta, StoreError> {
        let thread_id = state.thread_id();
        let _guard = self.locks.lock(thread_id).await;

        let mut document = match self.read_document(thread_id).await? {
            Some(existing) => {
                ensure_extends(&existing.messages, state)?;
                existing
            }
            None => ThreadDocument {
                thread_id: thread_id.to_string(),
                messages: Vec::new(),
                history: Vec::new(),
            },
        };

        let meta = CheckpointMeta::next(document.history.last(), state);
        document.messages = state.messages().to_vec();
        document.history.push(meta.clone());

        let encoded = serde_json::to_vec_pretty(&document)
            .map_err(|source| StoreError::serialization(thread_id, source))?;
        let path = self.path_for(thread_id);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, encoded)
            .await
            .map_err(|source| StoreError::io(&staging, source))?;
        fs::rename(&staging, &path)
            .await
            .map_err(|source| StoreError::io(&path, source))?;

        debug!(
            thread_id,
            version = meta.version,
            path = %path.display(),
            "Wrote checkpoint file"
        );
        Ok(meta)
    }

    async fn history(&self, thread_id: &str) -> Result<Vec<CheckpointMeta>, StoreError> {
        Ok(self
            .read_document(thread_id)
            .await?
            .map(|document| document.history)
            .unwrap_or_default())
    }
}
