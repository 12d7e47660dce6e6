use super::super::dto::{ErrorResponse, ThreadResponse};
use super::super::state::ServerState;
use crate::model::ModelProvider;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::SecondsFormat;
use std::sync::Arc;
use tracing::{debug, error};

#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    tag = "threads",
    params(("thread_id" = String, Path, description = "Thread to read")),
    responses(
        (status = 200, description = "Latest checkpoint of the thread", body = ThreadResponse),
        (status = 404, description = "No such thread", body = ErrorResponse),
        (status = 500, description = "Checkpoint store failure", body = ErrorResponse)
    )
)]
pub async fn thread_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Path(thread_id): Path<String>,
) -> Result<Json<ThreadResponse>, (StatusCode, Json<ErrorResponse>)> {
    let checkpoint = state.agent().checkpoint(&thread_id).await.map_err(|err| {
        error!(%err, thread_id = thread_id.as_str(), "Failed to load thread");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }),
        )
    })?;

    let Some(checkpoint) = checkpoint else {
        debug!(thread_id = thread_id.as_str(), "Thread not found");
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("thread '{thread_id}' not found"),
            }),
        ));
    };

    Ok(Json(ThreadResponse {
        thread_id: checkpoint.meta.thread_id,
        version: checkpoint.meta.version,
        saved_at: checkpoint
            .meta
            .saved_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        messages: checkpoint.state.messages().to_vec(),
    }))
}
