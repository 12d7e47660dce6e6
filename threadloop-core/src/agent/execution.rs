use crate::tooling::{ToolError, ToolRegistry};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use threadloop_session::{Message, ToolCall};
use tracing::{debug, warn};

/// Runs the tool calls of one assistant message.
///
/// Always yields exactly one tool result per call, in call order. A failing
/// call becomes an error result and does not affect its siblings.
pub struct ToolExecutor {
    tools: Arc<ToolRegistry>,
    timeout: Option<Duration>,
    parallel: bool,
}

impl ToolExecutor {
    pub fn new(tools: Arc<ToolRegistry>, timeout: Option<Duration>, parallel: bool) -> Self {
        Self {
            tools,
            timeout,
            parallel,
        }
    }

    pub async fn execute(&self, calls: &[ToolCall]) -> Vec<Message> {
        if self.parallel {
            join_all(calls.iter().map(|call| self.run_call(call))).await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                results.push(self.run_call(call).await);
            }
            results
        }
    }

    async fn run_call(&self, call: &ToolCall) -> Message {
        let invocation = self.tools.invoke(&call.tool_name, call.arguments.clone());
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, invocation)
                .await
                .unwrap_or_else(|_| {
                    Err(ToolError::execution_failed(
                        &call.tool_name,
                        format!("timed out after {}s", limit.as_secs_f64()),
                    ))
                }),
            None => invocation.await,
        };

        match outcome {
            Ok(value) => {
                debug!(
                    tool = call.tool_name.as_str(),
                    call_id = call.call_id.as_str(),
                    "Tool call succeeded"
                );
                Message::tool_result(&call.call_id, render_value(value))
            }
            Err(err) => {
                warn!(
                    tool = call.tool_name.as_str(),
                    call_id = call.call_id.as_str(),
                    error = %err,
                    "Tool call failed; returning error to the model"
                );
                Message::tool_error(&call.call_id, err.to_tool_content())
            }
        }
    }
}

fn render_value(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
