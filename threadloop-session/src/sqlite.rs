use crate::error::StoreError;
use crate::message::Message;
use crate::state::ConversationState;
use crate::store::{Checkpoint, CheckpointMeta, CheckpointStore, ensure_extends};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "CREATE TABLE IF NOT EXISTS messages (
        thread_id TEXT NOT NULL,
        seq INTEGER NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (thread_id, seq)
     );
     CREATE TABLE IF NOT EXISTS checkpoints (
        thread_id TEXT NOT NULL,
        version INTEGER NOT NULL,
        message_count INTEGER NOT NULL,
        saved_at TEXT NOT NULL,
        PRIMARY KEY (thread_id, version)
     );",
)];

/// SQLite-backed checkpoint store.
///
/// Messages are only ever inserted; each save adds the new suffix of the
/// thread and a checkpoint row in one transaction. A load reads messages up
/// to the latest checkpoint's count.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::io(parent, source))?;
        }
        let conn = Connection::open(path)?;
        init_db(&conn)?;
        info!(path = %path.display(), "Opened SQLite checkpoint store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, task: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            task(&mut guard)
        })
        .await?
    }
}

fn init_db(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
         );",
    )?;

    for (version, sql) in MIGRATIONS {
        let already: i64 = conn.query_row(
            "SELECT COUNT(1) FROM schema_migrations WHERE version = ?1",
            [*version],
            |r| r.get(0),
        )?;
        if already == 0 {
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, Utc::now().to_rfc3339()],
            )?;
        }
    }
    Ok(())
}

fn meta_from_row(row: &Row<'_>) -> rusqlite::Result<CheckpointMeta> {
    let raw_saved_at: String = row.get(3)?;
    let saved_at = DateTime::parse_from_rfc3339(&raw_saved_at)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let version: i64 = row.get(1)?;
    let message_count: i64 = row.get(2)?;
    Ok(CheckpointMeta {
        thread_id: row.get(0)?,
        version: version as u64,
        message_count: message_count as usize,
        saved_at,
    })
}

fn latest_meta(conn: &Connection, thread_id: &str) -> Result<Option<CheckpointMeta>, StoreError> {
    let meta = conn
        .query_row(
            "SELECT thread_id, version, message_count, saved_at FROM checkpoints
             WHERE thread_id = ?1 ORDER BY version DESC LIMIT 1",
            [thread_id],
            meta_from_row,
        )
        .optional()?;
    Ok(meta)
}

fn read_messages(
    conn: &Connection,
    thread_id: &str,
    count: usize,
) -> Result<Vec<Message>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT payload FROM messages WHERE thread_id = ?1 AND seq < ?2 ORDER BY seq ASC",
    )?;
    let payloads = stmt
        .query_map(params![thread_id, count as i64], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    payloads
        .iter()
        .map(|payload| {
            serde_json::from_str(payload).map_err(|source| StoreError::serialization(thread_id, source))
        })
        .collect()
}

#[async_trait]
impl CheckpointStore for SqliteStore {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let thread_id = thread_id.to_string();
        self.with_conn(move |conn| {
            let Some(meta) = latest_meta(conn, &thread_id)? else {
                return Ok(None);
            };
            let messages = read_messages(conn, &thread_id, meta.message_count)?;
            Ok(Some(Checkpoint {
                state: ConversationState::restore(thread_id, messages),
                meta,
            }))
        })
        .await
    }

    async fn save(&self, state: &ConversationState) -> Result<CheckpointMeta, StoreError> {
        let state = state.clone();
        self.with_conn(move |conn| {
            let thread_id = state.thread_id().to_string();
            let tx = conn.transaction()?;

            let previous = latest_meta(&tx, &thread_id)?;
            let stored_count = previous.as_ref().map_or(0, |meta| meta.message_count);
            let stored = read_messages(&tx, &thread_id, stored_count)?;
            ensure_extends(&stored, &state)?;

            {
                let mut insert = tx.prepare(
                    "INSERT INTO messages (thread_id, seq, payload) VALUES (?1, ?2, ?3)",
                )?;
                for (seq, message) in state.messages().iter().enumerate().skip(stored_count) {
                    let payload = serde_json::to_string(message)
                        .map_err(|source| StoreError::serialization(&thread_id, source))?;
                    insert.execute(params![thread_id, seq as i64, payload])?;
                }
            }

            let meta = CheckpointMeta::next(previous.as_ref(), &state);
            tx.execute(
                "INSERT INTO checkpoints (thread_id, version, message_count, saved_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    thread_id,
                    meta.version as i64,
                    meta.message_count as i64,
                    meta.saved_at.to_rfc3339()
                ],
            )?;
            tx.commit()?;

            debug!(
                thread_id = thread_id.as_str(),
                version = meta.version,
                appended = meta.message_count - stored_count,
                "Committed SQLite checkpoint"
            );
            Ok(meta)
        })
        .await
    }

    async fn history(&self, thread_id: &str) -> Result<Vec<CheckpointMeta>, StoreError> {
        let thread_id = thread_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT thread_id, version, message_count, saved_at FROM checkpoints
                 WHERE thread_id = ?1 ORDER BY version ASC",
            )?;
            let rows = stmt
                .query_map([thread_id.as_str()], meta_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }
}
