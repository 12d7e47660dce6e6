use crate::config::AppConfig;
use crate::config::defaults::{
    DEFAULT_MODEL, DEFAULT_PROMPT_TEMPLATE, DEFAULT_PROVIDER_ID, DEFAULT_RECURSION_LIMIT,
    DEFAULT_SYSTEM_MESSAGE,
};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentOptions {
    pub provider: String,
    pub model: String,
    pub system_message: String,
    pub prompt_template: String,
    pub recursion_limit: usize,
    pub reasoning_timeout: Option<Duration>,
    pub tool_timeout: Option<Duration>,
    pub parallel_tool_calls: bool,
    pub temperature: Option<f32>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER_ID.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            reasoning_timeout: None,
            tool_timeout: None,
            parallel_tool_calls: true,
            temperature: None,
        }
    }
}

impl AgentOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            provider: config.default_provider.clone(),
            model: config.model.clone(),
            system_message: config.system_message.clone(),
            prompt_template: config.prompt_template.clone(),
            recursion_limit: config.agent.recursion_limit,
            reasoning_timeout: Some(config.agent.reasoning_timeout),
            tool_timeout: Some(config.agent.tool_timeout),
            parallel_tool_calls: config.agent.parallel_tool_calls,
            temperature: config.agent.temperature,
        }
    }

    /// Limit of reasoning cycles per invocation; values below 1 become 1.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit.max(1);
        self
    }
}

/// Result of one successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOutcome {
    pub thread_id: String,
    pub response: String,
    /// Whether the response carries the final-answer marker. Display hint only.
    pub final_marker: bool,
    pub reasoning_steps: usize,
    pub tool_steps: usize,
    /// Thread length before this invocation's human message was added.
    pub loaded_messages: usize,
    pub total_messages: usize,
}
