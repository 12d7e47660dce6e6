// Agent loop scenarios - end to end through the real lookup tool and stores
//
// The reasoning function is scripted; tools, registry, state machine and
// checkpoint stores are the production implementations.

#[path = "../common/mod.rs"]
mod common;

use common::{ScriptedProvider, StaticSearch, lookup_call, lookup_registry};
use serde_json::Value;
use std::sync::Arc;
use threadloop_core::model::ModelResponse;
use threadloop_core::{Agent, AgentError, AgentOptions};
use threadloop_session::{
    CheckpointStore, FileStore, MemoryStore, MessageRole, SqliteStore, ToolCall,
};

fn agent(provider: ScriptedProvider, store: Arc<dyn CheckpointStore>) -> Agent<ScriptedProvider> {
    Agent::new(
        provider,
        lookup_registry(Arc::new(StaticSearch::hr())),
        store,
        AgentOptions::default(),
    )
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn plain_question_stops_after_first_cycle() {
    let provider = ScriptedProvider::answers(&["FINAL ANSWER: Office hours are 9 to 5."]);
    let agent = agent(provider.clone(), Arc::new(MemoryStore::new()));

    let outcome = agent
        .invoke(None, "When is the office open?")
        .await
        .expect("invoke");

    assert_eq!(outcome.response, "FINAL ANSWER: Office hours are 9 to 5.");
    assert_eq!(outcome.reasoning_steps, 1);
    assert_eq!(outcome.tool_steps, 0);
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn lookup_question_runs_one_tool_step() {
    let search = Arc::new(StaticSearch::hr());
    let provider = ScriptedProvider::new(vec![
        Ok(lookup_call("call_1", "Dana")),
        Ok(ModelResponse::text("FINAL ANSWER: Dana is the payroll lead.")),
    ]);
    let agent = Agent::new(
        provider.clone(),
        lookup_registry(search.clone()),
        Arc::new(MemoryStore::new()),
        AgentOptions::default(),
    );

    let outcome = agent.invoke(None, "Who is Dana?").await.expect("invoke");

    assert_eq!((outcome.reasoning_steps, outcome.tool_steps), (2, 1));
    assert_eq!(outcome.response, "FINAL ANSWER: Dana is the payroll lead.");
    assert_eq!(
        search.queries.lock().expect("queries").as_slice(),
        [("Dana".to_string(), 10)]
    );

    let context = &provider.requests()[1].messages;
    let result = context.last().expect("tool result");
    assert_eq!(result.role, MessageRole::ToolResult);
    let documents: Value = serde_json::from_str(&result.content).expect("json documents");
    assert_eq!(
        documents[0]["page_content"],
        "Dana Reyes, payroll lead, joined 2019"
    );
    assert_eq!(documents[0]["metadata"]["name"], "Dana");
}

#[tokio::test]
async fn schema_violation_is_reported_to_the_model() {
    let provider = ScriptedProvider::new(vec![
        Ok(ModelResponse::with_tool_calls(
            "",
            vec![ToolCall::new(
                "call_1",
                "employee_lookup",
                serde_json::json!({"query": "Dana", "n": 0}),
            )],
        )),
        Ok(ModelResponse::text("I could not search with that count.")),
    ]);
    let agent = agent(provider.clone(), Arc::new(MemoryStore::new()));

    let outcome = agent.invoke(None, "top 0 Danas").await.expect("invoke");
    assert_eq!(outcome.reasoning_steps, 2);

    let result = provider.requests()[1]
        .messages
        .last()
        .cloned()
        .expect("tool result");
    assert!(result.is_error);
    assert!(result.content.contains("invalid arguments"), "{}", result.content);
}

#[tokio::test]
async fn always_calling_tools_fails_at_the_bound() {
    let provider = ScriptedProvider::repeating(lookup_call("call_again", "Sam"));
    let store = Arc::new(MemoryStore::new());
    let agent = agent(provider.clone(), store.clone());

    let err = agent
        .invoke(Some("runaway".into()), "Who is Sam?")
        .await
        .expect_err("bounded");

    assert!(matches!(err, AgentError::RecursionLimitExceeded { limit: 15 }));
    assert_eq!(provider.requests().len(), 15);
    let saved = store.load("runaway").await.expect("load").expect("saved");
    let results = saved
        .state
        .messages()
        .iter()
        .filter(|m| m.role == MessageRole::ToolResult)
        .count();
    assert_eq!(results, 14);
}

#[tokio::test]
async fn sequential_invocations_share_thread_history() {
    let provider = ScriptedProvider::new(vec![
        Ok(lookup_call("call_1", "Sam")),
        Ok(ModelResponse::text("Sam is a recruiter.")),
        Ok(ModelResponse::text("Sam joined in 2021.")),
    ]);
    let agent = agent(provider, Arc::new(MemoryStore::new()));

    let first = agent
        .invoke(Some("hr-42".into()), "Who is Sam?")
        .await
        .expect("first");
    let second = agent
        .invoke(Some("hr-42".into()), "When did Sam join?")
        .await
        .expect("second");

    assert_eq!(first.thread_id, "hr-42");
    assert_eq!(second.loaded_messages, first.total_messages);
    assert_eq!(second.response, "Sam joined in 2021.");
}

// ============================================================================
// Durable resume
// ============================================================================

async fn resume_across_restarts(
    before: Arc<dyn CheckpointStore>,
    after: impl FnOnce() -> Arc<dyn CheckpointStore>,
) {
    let first = agent(
        ScriptedProvider::new(vec![
            Ok(lookup_call("call_1", "Dana")),
            Ok(ModelResponse::text("Dana is the payroll lead.")),
        ]),
        before,
    )
    .invoke(Some("durable".into()), "Who is Dana?")
    .await
    .expect("first run");

    let provider = ScriptedProvider::answers(&["She joined in 2019."]);
    let second = agent(provider.clone(), after())
        .invoke(Some("durable".into()), "When did she join?")
        .await
        .expect("second run");

    assert_eq!(second.loaded_messages, first.total_messages);
    let context = &provider.requests()[0].messages;
    assert_eq!(context.len(), first.total_messages + 1);
    assert_eq!(context[1].tool_calls[0].call_id, "call_1");
    assert_eq!(context[2].in_reply_to.as_deref(), Some("call_1"));
}

#[tokio::test]
async fn sqlite_threads_resume_after_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("checkpoints.sqlite");
    let before = Arc::new(SqliteStore::open(&path).expect("open sqlite"));
    resume_across_restarts(before, || -> Arc<dyn CheckpointStore> {
        Arc::new(SqliteStore::open(&path).expect("reopen sqlite"))
    })
    .await;
}

#[tokio::test]
async fn file_threads_resume_after_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("threads");
    let before = Arc::new(FileStore::open(&root).await.expect("open"));
    let after: Arc<dyn CheckpointStore> =
        Arc::new(FileStore::open(&root).await.expect("reopen"));
    resume_across_restarts(before, move || after).await;
}
