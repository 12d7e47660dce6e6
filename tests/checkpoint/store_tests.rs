// Checkpoint store tests - the same contract exercised against every backend
//
// Each backend must keep threads append-only, report unknown threads as
// `Ok(None)` and surface unreadable storage as an error.

use serde_json::json;
use std::sync::Arc;
use threadloop_session::{
    CheckpointStore, ConversationState, FileStore, MemoryStore, Message, SqliteStore, StoreError,
    ToolCall,
};

fn first_turn(thread_id: &str) -> ConversationState {
    let mut state = ConversationState::new(thread_id);
    state.append(Message::human("Wer leitet die Lohnbuchhaltung? 💼"));
    state.append(Message::assistant(
        "Let me check.",
        vec![
            ToolCall::new("call_a", "employee_lookup", json!({"query": "payroll", "n": 2})),
            ToolCall::new("call_b", "employee_lookup", json!({"query": "lead"})),
        ],
    ));
    state.append(Message::tool_result("call_a", r#"[{"page_content":"Dana"}]"#));
    state.append(Message::tool_error(
        "call_b",
        "Error: tool 'employee_lookup' failed: index offline. Please fix your mistakes.",
    ));
    state.append(Message::assistant("Dana leads payroll.", Vec::new()));
    state
}

async fn check_contract(store: Arc<dyn CheckpointStore>) {
    assert!(store.load("unknown").await.expect("load").is_none());
    assert!(store.history("unknown").await.expect("history").is_empty());

    let mut state = ConversationState::new("t-1");
    state.append(Message::human("Wer leitet die Lohnbuchhaltung? 💼"));
    let v1 = store.save(&state).await.expect("save v1");

    let state = first_turn("t-1");
    let v2 = store.save(&state).await.expect("save v2");
    assert!(v2.version > v1.version);
    assert_eq!(v2.message_count, 5);

    let loaded = store.load("t-1").await.expect("load").expect("present");
    assert_eq!(loaded.state, state);
    assert_eq!(loaded.meta, v2);

    let history = store.history("t-1").await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].message_count, 1);
    assert_eq!(history[1].version, v2.version);

    let mut diverged = ConversationState::new("t-1");
    diverged.append(Message::human("something else"));
    let err = store.save(&diverged).await.expect_err("rewrite");
    assert!(matches!(err, StoreError::NonMonotonic { stored: 5, .. }));
    assert_eq!(
        store.load("t-1").await.expect("load").expect("present").state,
        state
    );

    let other = first_turn("t-2");
    store.save(&other).await.expect("other thread");
    assert_eq!(store.history("t-1").await.expect("history").len(), 2);

    check_float_arguments(store.as_ref()).await;
}

/// Float arguments must survive encoding bit for bit, or the next save is
/// no longer seen as an extension of the stored thread.
async fn check_float_arguments(store: &dyn CheckpointStore) {
    for (i, value) in [1.0715660391465826e-75, 0.1 + 0.2, 2.2250738585072014e-308, 1e300]
        .into_iter()
        .enumerate()
    {
        let thread_id = format!("floats-{i}");
        let mut state = ConversationState::new(thread_id.as_str());
        state.append(Message::human("rank candidates"));
        state.append(Message::assistant(
            "",
            vec![ToolCall::new(
                "call_f",
                "employee_lookup",
                json!({"query": "payroll", "weight": value}),
            )],
        ));
        store.save(&state).await.expect("first save");

        let loaded = store.load(&thread_id).await.expect("load").expect("present");
        assert_eq!(loaded.state, state, "{value:e} changed on load");

        state.append(Message::tool_result("call_f", "[]"));
        let meta = store.save(&state).await.expect("save after append");
        assert_eq!(meta.message_count, 3);
        let reloaded = store.load(&thread_id).await.expect("load").expect("present");
        let weight = reloaded.state.messages()[1].tool_calls[0].arguments["weight"].as_f64();
        assert_eq!(weight, Some(value));
    }
}

#[tokio::test]
async fn memory_store_contract() {
    check_contract(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn file_store_contract() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path().join("threads")).await.expect("open");
    check_contract(Arc::new(store)).await;
}

#[tokio::test]
async fn sqlite_store_contract() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::open(dir.path().join("nested").join("db.sqlite")).expect("open");
    check_contract(Arc::new(store)).await;
}

#[tokio::test]
async fn sqlite_in_memory_contract() {
    check_contract(Arc::new(SqliteStore::open_in_memory().expect("open"))).await;
}

#[tokio::test]
async fn unreadable_storage_is_not_an_empty_thread() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, vec![b'x'; 8192]).expect("write");

    let err = FileStore::open(&blocker).await.err().expect("cannot open");
    assert!(matches!(err, StoreError::Io { .. }));

    let err = SqliteStore::open(&blocker).err().expect("not a database");
    assert!(matches!(err, StoreError::Sqlite(_)));
}
