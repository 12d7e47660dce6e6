use crate::tooling::ToolSpec;
use serde::{Deserialize, Serialize};
use threadloop_session::Message;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    /// Continue this thread; a new one is started when absent.
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Body of `POST /chat/{thread_id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ThreadMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub thread_id: String,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub version: u64,
    /// RFC 3339 timestamp of the latest checkpoint.
    pub saved_at: String,
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToolInventoryResponse {
    pub tools: Vec<ToolSpec>,
}
