//! JSON-over-HTTP transport shared by the provider clients.

use crate::model::types::ModelError;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// How a provider expects its API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum KeyPlacement {
    Bearer,
    Header(&'static str),
}

#[derive(Clone)]
pub(super) struct ProviderTransport {
    pub(super) provider: String,
    endpoint: String,
    api_key: Option<String>,
    placement: KeyPlacement,
    http: Client,
}

impl ProviderTransport {
    pub(super) fn new(
        provider: String,
        endpoint: String,
        api_key: Option<String>,
        placement: KeyPlacement,
    ) -> Self {
        Self {
            provider,
            endpoint,
            api_key,
            placement,
            http: Client::new(),
        }
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Posts `body` to `path` and decodes the JSON reply. A blank or
    /// missing key fails before anything is sent.
    pub(super) async fn post<Req, Res>(&self, path: &str, body: &Req) -> Result<Res, ModelError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let request = self.authorize(self.http.post(self.url(path)))?;
        let network = |e: reqwest::Error| ModelError::network(&self.provider, e);
        request
            .json(body)
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?
            .json()
            .await
            .map_err(network)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ModelError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ModelError::missing_api_key(&self.provider))?;
        Ok(match self.placement {
            KeyPlacement::Bearer => request.bearer_auth(key),
            KeyPlacement::Header(name) => request.header(name, key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let transport =
            ProviderTransport::new("p".into(), "http://host:1/".into(), None, KeyPlacement::Bearer);
        assert_eq!(transport.url("/v1/chat"), "http://host:1/v1/chat");
        assert_eq!(transport.url("v1/chat"), "http://host:1/v1/chat");
    }

    #[tokio::test]
    async fn blank_key_fails_before_any_request() {
        let transport = ProviderTransport::new(
            "p".into(),
            "http://127.0.0.1:9".into(),
            Some("  ".into()),
            KeyPlacement::Header("x-goog-api-key"),
        );
        let result: Result<serde_json::Value, _> =
            transport.post("/x", &serde_json::json!({})).await;
        assert!(matches!(result, Err(ModelError::MissingApiKey { .. })));
    }
}
