//! Similarity search over the HR document index.
//!
//! Embedding and ranking happen behind [`DocumentSearch`]; this crate only
//! ships an HTTP client for a search service.

use super::error::SearchError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    #[serde(flatten)]
    pub document: Document,
    pub score: f64,
}

#[async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Returns at most `k` documents, best match first.
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, SearchError>;
}

/// Posts `{query, k, index}` to a search service and expects
/// `{"results": [{page_content, metadata, score}, ...]}` back.
#[derive(Clone)]
pub struct HttpDocumentSearch {
    http: Client,
    endpoint: String,
    index: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
    index: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<ScoredDocument>,
}

impl HttpDocumentSearch {
    pub fn new(endpoint: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            index: index.into(),
        }
    }
}

#[async_trait]
impl DocumentSearch for HttpDocumentSearch {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, SearchError> {
        debug!(index = self.index.as_str(), k, "Querying document search");
        let response: SearchResponse = self
            .http
            .post(&self.endpoint)
            .json(&SearchRequest {
                query,
                k,
                index: &self.index,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut results = response.results;
        if results.len() > k {
            results.truncate(k);
        }
        if results.iter().any(|r| !r.score.is_finite()) {
            return Err(SearchError::InvalidResponse(
                "result score is not a finite number".to_string(),
            ));
        }
        Ok(results)
    }
}
