//! Message adapters - convert the conversation into provider wire formats
//!
//! Tool calls that never received a result are left out of the rendered
//! request. Providers reject a function call without a matching response,
//! and such calls only exist after an invocation stopped at its cycle limit.

use crate::tooling::ToolSpec;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use threadloop_session::{Message, MessageRole, ToolCall};

/// Schema keywords the Gemini function declaration format does not accept.
const GEMINI_UNSUPPORTED_KEYWORDS: &[&str] = &["$schema", "additionalProperties", "default"];

pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to OpenAI-style chat messages, system prompt first.
    pub fn to_openai_format(system_prompt: &str, messages: &[Message]) -> Vec<Value> {
        let answered = answered_calls(messages);
        let mut rendered = Vec::with_capacity(messages.len() + 1);
        if !system_prompt.is_empty() {
            rendered.push(json!({"role": "system", "content": system_prompt}));
        }

        for message in messages {
            match message.role {
                MessageRole::Human => rendered.push(json!({
                    "role": "user",
                    "content": message.content,
                })),
                MessageRole::Assistant => {
                    let calls: Vec<Value> = answered_only(&message.tool_calls, &answered)
                        .map(|call| {
                            json!({
                                "id": call.call_id,
                                "type": "function",
                                "function": {
                                    "name": call.tool_name,
                                    "arguments": call.arguments.to_string(),
                                }
                            })
                        })
                        .collect();
                    if calls.is_empty() && message.content.is_empty() {
                        continue;
                    }
                    let mut entry = json!({"role": "assistant", "content": message.content});
                    if !calls.is_empty() {
                        entry["tool_calls"] = Value::Array(calls);
                    }
                    rendered.push(entry);
                }
                MessageRole::ToolResult => rendered.push(json!({
                    "role": "tool",
                    "tool_call_id": message.in_reply_to.as_deref().unwrap_or_default(),
                    "content": message.content,
                })),
            }
        }
        rendered
    }

    pub fn to_openai_tools(tools: &[ToolSpec]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect()
    }

    /// Convert messages to Gemini `contents`.
    ///
    /// Consecutive tool results are grouped into one turn of
    /// `functionResponse` parts, which is how Gemini pairs them with the
    /// preceding `functionCall` parts.
    pub fn to_gemini_format(messages: &[Message]) -> Vec<Value> {
        let answered = answered_calls(messages);
        let mut call_names: HashMap<&str, &str> = HashMap::new();
        let mut contents: Vec<Value> = Vec::new();
        let mut pending_responses: Vec<Value> = Vec::new();

        for message in messages {
            if message.role != MessageRole::ToolResult && !pending_responses.is_empty() {
                contents.push(json!({"role": "user", "parts": std::mem::take(&mut pending_responses)}));
            }
            match message.role {
                MessageRole::Human => contents.push(json!({
                    "role": "user",
                    "parts": [{"text": message.content}],
                })),
                MessageRole::Assistant => {
                    let mut parts = Vec::new();
                    if !message.content.is_empty() {
                        parts.push(json!({"text": message.content}));
                    }
                    for call in answered_only(&message.tool_calls, &answered) {
                        call_names.insert(call.call_id.as_str(), call.tool_name.as_str());
                        parts.push(json!({
                            "functionCall": {
                                "name": call.tool_name,
                                "args": as_object(&call.arguments),
                            }
                        }));
                    }
                    if !parts.is_empty() {
                        contents.push(json!({"role": "model", "parts": parts}));
                    }
                }
                MessageRole::ToolResult => {
                    let call_id = message.in_reply_to.as_deref().unwrap_or_default();
                    let name = call_names.get(call_id).copied().unwrap_or(call_id);
                    let body = serde_json::from_str::<Value>(&message.content)
                        .unwrap_or_else(|_| Value::String(message.content.clone()));
                    let key = if message.is_error { "error" } else { "content" };
                    let mut response = Map::new();
                    response.insert(key.to_string(), body);
                    pending_responses.push(json!({
                        "functionResponse": {
                            "name": name,
                            "response": response,
                        }
                    }));
                }
            }
        }
        if !pending_responses.is_empty() {
            contents.push(json!({"role": "user", "parts": pending_responses}));
        }
        contents
    }

    pub fn to_gemini_tools(tools: &[ToolSpec]) -> Vec<Value> {
        if tools.is_empty() {
            return Vec::new();
        }
        let declarations: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": strip_keywords(&tool.parameters, GEMINI_UNSUPPORTED_KEYWORDS),
                })
            })
            .collect();
        vec![json!({"functionDeclarations": declarations})]
    }
}

fn answered_calls(messages: &[Message]) -> HashSet<&str> {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::ToolResult)
        .filter_map(|m| m.in_reply_to.as_deref())
        .collect()
}

fn answered_only<'a>(
    calls: &'a [ToolCall],
    answered: &'a HashSet<&str>,
) -> impl Iterator<Item = &'a ToolCall> + 'a {
    calls
        .iter()
        .filter(move |call| answered.contains(call.call_id.as_str()))
}

fn as_object(arguments: &Value) -> Value {
    match arguments {
        Value::Object(_) => arguments.clone(),
        Value::Null => Value::Object(Map::new()),
        other => json!({"input": other}),
    }
}

fn strip_keywords(schema: &Value, keywords: &[&str]) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !keywords.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), strip_keywords(value, keywords)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| strip_keywords(item, keywords))
                .collect(),
        ),
        other => other.clone(),
    }
}
