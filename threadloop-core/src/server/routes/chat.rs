use super::super::dto::{ChatRequest, ChatResponse, ErrorResponse, ThreadMessageRequest};
use super::super::state::ServerState;
use crate::agent::AgentError;
use crate::model::ModelProvider;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info, warn};

type ApiError = (StatusCode, Json<ErrorResponse>);

#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The agent answered", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 409, description = "The thread is busy with another message", body = ErrorResponse),
        (status = 500, description = "The agent failed", body = ErrorResponse)
    )
)]
pub async fn chat_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    run_turn(&state, payload.thread_id, payload.message).await
}

#[utoipa::path(
    post,
    path = "/chat/{thread_id}",
    tag = "chat",
    params(("thread_id" = String, Path, description = "Thread to continue")),
    request_body = ThreadMessageRequest,
    responses(
        (status = 200, description = "The agent answered", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 409, description = "The thread is busy with another message", body = ErrorResponse),
        (status = 500, description = "The agent failed", body = ErrorResponse)
    )
)]
pub async fn thread_chat_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Path(thread_id): Path<String>,
    Json(payload): Json<ThreadMessageRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    run_turn(&state, Some(thread_id), payload.message).await
}

async fn run_turn<P: ModelProvider>(
    state: &ServerState<P>,
    thread_id: Option<String>,
    message: String,
) -> Result<Json<ChatResponse>, ApiError> {
    info!(thread_id = thread_id.as_deref(), "Received chat request");

    if message.trim().is_empty() {
        warn!("Rejecting chat request with empty message");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "message cannot be empty".to_string(),
            }),
        ));
    }

    match state.agent().invoke(thread_id, message).await {
        Ok(outcome) => Ok(Json(ChatResponse {
            thread_id: outcome.thread_id,
            response: outcome.response,
        })),
        Err(err) => Err(agent_error_response(err)),
    }
}

fn agent_error_response(err: AgentError) -> ApiError {
    match err {
        AgentError::ThreadBusy { .. } => {
            warn!(%err, "Rejecting concurrent message for thread");
            (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: err.user_message(),
                }),
            )
        }
        err => {
            error!(%err, "Agent invocation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                }),
            )
        }
    }
}
