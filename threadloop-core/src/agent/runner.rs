use super::errors::AgentError;
use super::execution::ToolExecutor;
use super::machine::{Halt, LoopState, StepEvent};
use super::models::{AgentOptions, AgentOutcome};
use super::reasoning::ReasoningStep;
use super::router::route;
use crate::config::defaults::FINAL_ANSWER_MARKER;
use crate::model::ModelProvider;
use crate::tooling::ToolRegistry;
use chrono::Utc;
use std::sync::Arc;
use threadloop_session::{
    Checkpoint, CheckpointStore, ConversationState, Message, ThreadLocks, generate_thread_id,
};
use tracing::{debug, info, warn};

/// Drives one conversation turn from the user's message to a final answer.
///
/// The thread is loaded (or created) from the checkpoint store, the human
/// message is appended, and reasoning and tool steps alternate until the
/// model stops asking for tools. State is saved after every step, so an
/// invocation that fails part-way leaves its progress behind.
pub struct Agent<P: ModelProvider> {
    reasoning: ReasoningStep<P>,
    executor: ToolExecutor,
    tools: Arc<ToolRegistry>,
    store: Arc<dyn CheckpointStore>,
    locks: ThreadLocks,
    recursion_limit: usize,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(
        provider: P,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn CheckpointStore>,
        options: AgentOptions,
    ) -> Self {
        Self {
            reasoning: ReasoningStep::new(provider, &options),
            executor: ToolExecutor::new(
                Arc::clone(&tools),
                options.tool_timeout,
                options.parallel_tool_calls,
            ),
            tools,
            store,
            locks: ThreadLocks::new(),
            recursion_limit: options.recursion_limit.max(1),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn provider(&self) -> &P {
        self.reasoning.provider()
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Latest stored snapshot of a thread, if any.
    pub async fn checkpoint(&self, thread_id: &str) -> Result<Option<Checkpoint>, AgentError> {
        Ok(self.store.load(thread_id).await?)
    }

    pub async fn invoke(
        &self,
        thread_id: Option<String>,
        query: impl Into<String>,
    ) -> Result<AgentOutcome, AgentError> {
        let thread_id = thread_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_thread_id);
        let _guard = self
            .locks
            .try_lock(&thread_id)
            .ok_or_else(|| AgentError::ThreadBusy {
                thread_id: thread_id.clone(),
            })?;

        let mut conversation = match self.store.load(&thread_id).await? {
            Some(checkpoint) => {
                info!(
                    thread_id = thread_id.as_str(),
                    version = checkpoint.meta.version,
                    messages = checkpoint.state.len(),
                    "Resuming thread from checkpoint"
                );
                checkpoint.state
            }
            None => {
                info!(thread_id = thread_id.as_str(), "Starting new thread");
                ConversationState::new(thread_id.as_str())
            }
        };
        let loaded_messages = conversation.len();

        conversation.append(Message::human(query));
        self.store.save(&conversation).await?;

        let limit = self.recursion_limit;
        let mut reasoning_steps = 0;
        let mut tool_steps = 0;
        let mut state = LoopState::Start;

        while !state.is_terminal() {
            let event = match state {
                LoopState::Start => StepEvent::Begin,
                LoopState::Reasoning { cycle } => {
                    debug!(thread_id = thread_id.as_str(), cycle, "Reasoning step");
                    let message = self
                        .reasoning
                        .run(&conversation, &self.tools, Utc::now())
                        .await?;
                    conversation.append(message);
                    self.store.save(&conversation).await?;
                    reasoning_steps += 1;
                    StepEvent::Reasoned
                }
                LoopState::Routing { .. } => StepEvent::Routed(route(conversation.messages())),
                LoopState::Tools { cycle } => {
                    let calls = conversation
                        .last()
                        .map(|message| message.tool_calls.clone())
                        .unwrap_or_default();
                    debug!(
                        thread_id = thread_id.as_str(),
                        cycle,
                        calls = calls.len(),
                        "Tool execution step"
                    );
                    let results = self.executor.execute(&calls).await;
                    conversation.extend(results);
                    self.store.save(&conversation).await?;
                    tool_steps += 1;
                    StepEvent::ToolsExecuted
                }
                LoopState::End => break,
            };

            state = state.next(event, limit).map_err(|halt| match halt {
                Halt::LimitExceeded { cycle } => {
                    warn!(
                        thread_id = thread_id.as_str(),
                        cycle, "Reasoning cycle limit reached with tools still requested"
                    );
                    AgentError::RecursionLimitExceeded { limit }
                }
                Halt::OutOfOrder { state, event } => AgentError::InvalidTransition {
                    state,
                    event: event.name(),
                },
            })?;
        }

        let response = conversation
            .last_assistant()
            .map(|message| message.content.clone())
            .unwrap_or_default();
        info!(
            thread_id = thread_id.as_str(),
            reasoning_steps,
            tool_steps,
            messages = conversation.len(),
            "Agent invocation finished"
        );

        Ok(AgentOutcome {
            final_marker: response.trim_start().starts_with(FINAL_ANSWER_MARKER),
            response,
            reasoning_steps,
            tool_steps,
            loaded_messages,
            total_messages: conversation.len(),
            thread_id,
        })
    }
}
