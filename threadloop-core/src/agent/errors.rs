use super::machine::LoopState;
use crate::model::ModelError;
use std::time::Duration;
use thiserror::Error;
use threadloop_session::StoreError;

/// Why the reasoning function produced no message.
#[derive(Debug, Error)]
pub enum ReasoningFailure {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("no answer within {0:?}")]
    TimedOut(Duration),
}

/// Errors that end an agent invocation.
///
/// Tool failures are absent on purpose: they become tool results and the
/// loop carries on.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("reasoning function unavailable: {0}")]
    ReasoningUnavailable(#[from] ReasoningFailure),
    #[error("stopped after {limit} reasoning cycles while tools were still requested")]
    RecursionLimitExceeded { limit: usize },
    #[error("checkpoint store error: {0}")]
    Storage(#[from] StoreError),
    #[error("thread '{thread_id}' is already being processed")]
    ThreadBusy { thread_id: String },
    #[error("loop state {state:?} cannot handle {event}")]
    InvalidTransition { state: LoopState, event: &'static str },
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::ReasoningUnavailable(ReasoningFailure::Model(err)) => err.user_message(),
            AgentError::ReasoningUnavailable(ReasoningFailure::TimedOut(_)) => {
                "The model took too long to answer. Please try again.".to_string()
            }
            AgentError::RecursionLimitExceeded { .. } => {
                "The agent could not finish within its step limit. Try a more specific question."
                    .to_string()
            }
            AgentError::Storage(_) => "Conversation history is unavailable right now.".to_string(),
            AgentError::ThreadBusy { thread_id } => {
                format!("Conversation '{thread_id}' is still answering a previous message.")
            }
            AgentError::InvalidTransition { .. } => "Internal server error".to_string(),
        }
    }
}
