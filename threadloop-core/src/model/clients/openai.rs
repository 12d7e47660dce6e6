//! OpenAI-compatible client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use threadloop_session::ToolCall;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::transport::{KeyPlacement, ProviderTransport};
use crate::config::ModelProviderConfig;
use crate::model::adapter::MessageAdapter;
use crate::model::factory::resolve_api_key;
use crate::model::traits::ModelClient;
use crate::model::types::{ModelError, ModelRequest, ModelResponse};

/// OpenAI-compatible client (OpenAI, Groq, Mistral, vLLM and similar)
#[derive(Clone)]
pub struct OpenAIClient {
    transport: ProviderTransport,
    api_path: String,
}

impl OpenAIClient {
    pub fn from_config(config: &ModelProviderConfig) -> Self {
        let api_key = resolve_api_key(&config.id, config.api_key.as_deref());
        Self {
            transport: ProviderTransport::new(
                config.id.clone(),
                config.endpoint.clone(),
                api_key,
                KeyPlacement::Bearer,
            ),
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| "/v1/chat/completions".to_string()),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAIClient {
    fn id(&self) -> &str {
        &self.transport.provider
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let payload = OpenAIRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_openai_format(&request.system_prompt, &request.messages),
            tools: MessageAdapter::to_openai_tools(&request.tools),
            temperature: request.temperature,
            stream: false,
        };

        info!(
            provider = self.transport.provider.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending request to OpenAI-compatible provider"
        );

        let response: OpenAIResponse = self.transport.post(&self.api_path, &payload).await?;
        debug!("Received response from OpenAI-compatible provider");

        parse_response(&self.transport.provider, response)
    }
}

fn parse_response(provider: &str, response: OpenAIResponse) -> Result<ModelResponse, ModelError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .ok_or_else(|| ModelError::invalid_response(provider, "missing message"))?;

    let tool_calls = message
        .tool_calls
        .into_iter()
        .map(|call| {
            // Unparsable arguments are kept as a raw string so schema
            // validation reports them back to the model.
            let arguments = serde_json::from_str::<Value>(&call.function.arguments)
                .unwrap_or_else(|err| {
                    warn!(
                        provider,
                        tool = call.function.name.as_str(),
                        %err,
                        "Tool arguments are not valid JSON"
                    );
                    Value::String(call.function.arguments.clone())
                });
            let id = call
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));
            ToolCall::new(id, call.function.name, arguments)
        })
        .collect();

    Ok(ModelResponse::with_tool_calls(
        message.content.unwrap_or_default(),
        tool_calls,
    ))
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAIToolCall>,
}

#[derive(Deserialize)]
struct OpenAIToolCall {
    id: Option<String>,
    function: OpenAIFunction,
}

#[derive(Deserialize)]
struct OpenAIFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}
