//! # threadloop-session
//!
//! Conversation state for threadloop agents and the stores that checkpoint it.
//!
//! A [`ConversationState`] is an append-only list of [`Message`]s keyed by a
//! thread id. [`CheckpointStore`] implementations persist a snapshot after
//! every step of an agent invocation so a thread can be resumed later:
//!
//! | Store | Backing | Use |
//! |-------|---------|-----|
//! | [`MemoryStore`] | process memory | tests, throwaway runs |
//! | [`FileStore`] | one JSON file per thread | small deployments |
//! | [`SqliteStore`] | SQLite database | default for the service |

pub mod error;
pub mod file;
pub mod locks;
pub mod memory;
pub mod message;
pub mod sqlite;
pub mod state;
pub mod store;

pub use error::{MessageError, StoreError};
pub use file::FileStore;
pub use locks::{ThreadGuard, ThreadLocks};
pub use memory::MemoryStore;
pub use message::{Message, MessageRole, ToolCall};
pub use sqlite::SqliteStore;
pub use state::{ConversationState, generate_thread_id};
pub use store::{Checkpoint, CheckpointMeta, CheckpointStore};
