use super::errors::{AgentError, ReasoningFailure};
use super::instructions::render_instructions;
use super::models::AgentOptions;
use crate::model::{ModelProvider, ModelRequest};
use crate::tooling::ToolRegistry;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use threadloop_session::{ConversationState, Message, ToolCall};
use tracing::{debug, warn};
use uuid::Uuid;

/// Calls the reasoning function once and turns its answer into an
/// assistant message. The caller appends the message.
pub struct ReasoningStep<P: ModelProvider> {
    provider: P,
    provider_id: String,
    model: String,
    prompt_template: String,
    system_message: String,
    temperature: Option<f32>,
    timeout: Option<Duration>,
}

impl<P: ModelProvider> ReasoningStep<P> {
    pub fn new(provider: P, options: &AgentOptions) -> Self {
        Self {
            provider,
            provider_id: options.provider.clone(),
            model: options.model.clone(),
            prompt_template: options.prompt_template.clone(),
            system_message: options.system_message.clone(),
            temperature: options.temperature,
            timeout: options.reasoning_timeout,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn run(
        &self,
        state: &ConversationState,
        tools: &ToolRegistry,
        now: DateTime<Utc>,
    ) -> Result<Message, AgentError> {
        let request = ModelRequest {
            provider: self.provider_id.clone(),
            model: self.model.clone(),
            system_prompt: render_instructions(
                &self.prompt_template,
                &tools.tool_names(),
                &self.system_message,
                now,
            ),
            messages: state.messages().to_vec(),
            tools: tools.specs(),
            temperature: self.temperature,
        };

        let call = self.provider.chat(request);
        let response = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        thread_id = state.thread_id(),
                        timeout_ms = limit.as_millis() as u64,
                        "Reasoning function timed out"
                    );
                    return Err(ReasoningFailure::TimedOut(limit).into());
                }
            },
            None => call.await,
        }
        .map_err(ReasoningFailure::from)?;

        let tool_calls = assign_call_ids(state, response.tool_calls);
        debug!(
            thread_id = state.thread_id(),
            tool_calls = tool_calls.len(),
            content_len = response.content.len(),
            "Reasoning step produced assistant message"
        );
        Ok(Message::assistant(response.content, tool_calls))
    }
}

/// Replaces empty or already-used call ids so every call in the thread can be
/// matched to exactly one result.
fn assign_call_ids(state: &ConversationState, calls: Vec<ToolCall>) -> Vec<ToolCall> {
    let mut seen: HashSet<String> = state
        .messages()
        .iter()
        .flat_map(|m| m.tool_calls.iter().map(|c| c.call_id.clone()))
        .collect();

    calls
        .into_iter()
        .map(|mut call| {
            if call.call_id.trim().is_empty() || seen.contains(&call.call_id) {
                call.call_id = format!("call_{}", Uuid::new_v4().simple());
            }
            seen.insert(call.call_id.clone());
            call
        })
        .collect()
}
