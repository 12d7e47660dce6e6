//! Gemini client implementation

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use threadloop_session::ToolCall;
use tracing::{debug, info};
use uuid::Uuid;

use super::transport::{KeyPlacement, ProviderTransport};
use crate::config::ModelProviderConfig;
use crate::constants::DEFAULT_GEMINI_API_PATH;
use crate::model::adapter::MessageAdapter;
use crate::model::factory::resolve_api_key;
use crate::model::traits::ModelClient;
use crate::model::types::{ModelError, ModelRequest, ModelResponse};

/// Gemini client for Google AI
#[derive(Clone)]
pub struct GeminiClient {
    transport: ProviderTransport,
    api_path: String,
}

impl GeminiClient {
    pub fn from_config(config: &ModelProviderConfig) -> Self {
        let api_key = resolve_api_key(&config.id, config.api_key.as_deref());
        Self {
            transport: ProviderTransport::new(
                config.id.clone(),
                config.endpoint.clone(),
                api_key,
                KeyPlacement::Header("x-goog-api-key"),
            ),
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| DEFAULT_GEMINI_API_PATH.to_string()),
        }
    }

    fn model_path(&self, model: &str) -> String {
        format!("{}/{model}:generateContent", self.api_path.trim_matches('/'))
    }

    fn build_payload(request: &ModelRequest) -> Value {
        let mut payload = json!({
            "contents": MessageAdapter::to_gemini_format(&request.messages),
        });
        if !request.system_prompt.is_empty() {
            payload["systemInstruction"] = json!({
                "parts": [{"text": request.system_prompt}]
            });
        }
        let tools = MessageAdapter::to_gemini_tools(&request.tools);
        if !tools.is_empty() {
            payload["tools"] = Value::Array(tools);
        }
        if let Some(temperature) = request.temperature {
            payload["generationConfig"] = json!({"temperature": temperature});
        }
        payload
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn id(&self) -> &str {
        &self.transport.provider
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let path = self.model_path(&request.model);
        let payload = Self::build_payload(&request);

        info!(
            provider = self.transport.provider.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending request to Gemini"
        );

        let response: GeminiResponse = self.transport.post(&path, &payload).await?;
        debug!("Received response from Gemini");

        parse_response(&self.transport.provider, response)
    }
}

fn parse_response(provider: &str, response: GeminiResponse) -> Result<ModelResponse, ModelError> {
    let parts = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .ok_or_else(|| ModelError::invalid_response(provider, "missing candidate content"))?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for part in parts {
        if let Some(chunk) = part.text {
            text.push_str(&chunk);
        }
        if let Some(call) = part.function_call {
            let id = format!("call_{}", Uuid::new_v4().simple());
            tool_calls.push(ToolCall::new(id, call.name, call.args.unwrap_or(Value::Null)));
        }
    }

    if text.is_empty() && tool_calls.is_empty() {
        return Err(ModelError::invalid_response(
            provider,
            "candidate has neither text nor function calls",
        ));
    }
    Ok(ModelResponse::with_tool_calls(text, tool_calls))
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}
