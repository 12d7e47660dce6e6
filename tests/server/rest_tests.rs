// REST server tests - the router on an ephemeral port, called over HTTP
//
// The model is scripted; everything between the socket and the checkpoint
// store is the production stack.

#[path = "../common/mod.rs"]
mod common;

use common::{ScriptedProvider, StaticSearch, lookup_call, lookup_registry};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use threadloop_core::model::{ModelError, ModelResponse};
use threadloop_core::server::serve_listener;
use threadloop_core::{Agent, AgentOptions};
use threadloop_session::MemoryStore;
use tokio::net::TcpListener;

async fn spawn_server(provider: ScriptedProvider) -> String {
    let agent = Agent::new(
        provider,
        lookup_registry(Arc::new(StaticSearch::hr())),
        Arc::new(MemoryStore::new()),
        AgentOptions::default(),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = serve_listener(Arc::new(agent), listener, &[]).await;
    });
    format!("http://{addr}")
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn chat_starts_a_thread_and_continues_it() {
    let base = spawn_server(ScriptedProvider::new(vec![
        Ok(lookup_call("call_1", "Dana")),
        Ok(ModelResponse::text("FINAL ANSWER: Dana leads payroll.")),
        Ok(ModelResponse::text("She joined in 2019.")),
    ]))
    .await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{base}/chat"))
        .json(&json!({"message": "Who is Dana?"}))
        .send()
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["response"], "FINAL ANSWER: Dana leads payroll.");
    let thread_id = body["thread_id"].as_str().expect("thread id").to_string();
    assert!(!thread_id.is_empty());

    let body: Value = http
        .post(format!("{base}/chat/{thread_id}"))
        .json(&json!({"message": "When did she join?"}))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert_eq!(body["thread_id"], thread_id.as_str());
    assert_eq!(body["response"], "She joined in 2019.");

    let thread: Value = http
        .get(format!("{base}/threads/{thread_id}"))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    let messages = thread["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 6);
    assert_eq!(messages[0]["role"], "human");
    assert_eq!(messages[1]["tool_calls"][0]["tool_name"], "employee_lookup");
    assert_eq!(messages[2]["role"], "tool_result");
    assert_eq!(messages[2]["in_reply_to"], "call_1");
    assert_eq!(thread["version"].as_u64(), Some(6));
}

#[tokio::test]
async fn empty_message_is_a_bad_request() {
    let provider = ScriptedProvider::answers(&["unused"]);
    let base = spawn_server(provider.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/chat"))
        .json(&json!({"message": "   "}))
        .send()
        .await
        .expect("send");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn loop_failures_hide_details() {
    let base = spawn_server(ScriptedProvider::new(vec![Err(
        ModelError::missing_api_key("gemini"),
    )]))
    .await;

    let response = reqwest::Client::new()
        .post(format!("{base}/chat"))
        .json(&json!({"message": "hello", "thread_id": "t-500"}))
        .send()
        .await
        .expect("send");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body, json!({"error": "Internal server error"}));
}

// ============================================================================
// Threads, tools and docs
// ============================================================================

#[tokio::test]
async fn unknown_thread_is_not_found() {
    let base = spawn_server(ScriptedProvider::default()).await;
    let response = reqwest::get(format!("{base}/threads/nope"))
        .await
        .expect("send");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tools_banner_and_openapi_are_served() {
    let base = spawn_server(ScriptedProvider::default()).await;

    let banner = reqwest::get(format!("{base}/"))
        .await
        .expect("send")
        .text()
        .await
        .expect("text");
    assert_eq!(banner, threadloop_core::constants::SERVER_BANNER);

    let tools: Value = reqwest::get(format!("{base}/tools"))
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert_eq!(tools["tools"][0]["name"], "employee_lookup");
    assert_eq!(
        tools["tools"][0]["parameters"]["required"],
        json!(["query"])
    );

    let doc: Value = reqwest::get(format!("{base}/api-doc/openapi.json"))
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert!(doc["paths"]["/chat"]["post"].is_object());
    assert!(doc["paths"]["/chat/{thread_id}"]["post"].is_object());
    assert!(doc["paths"]["/threads/{thread_id}"]["get"].is_object());
}
