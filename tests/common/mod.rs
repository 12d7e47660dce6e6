// Shared fakes for the integration tests: a scripted reasoning function and
// an in-memory document search behind the real employee lookup tool.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Map, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use threadloop_core::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use threadloop_core::tooling::{
    Document, DocumentSearch, EMPLOYEE_LOOKUP, EmployeeLookupTool, ScoredDocument, SearchError,
    ToolRegistry,
};
use threadloop_session::ToolCall;

#[derive(Clone, Default)]
pub struct ScriptedProvider {
    responses: Arc<Mutex<VecDeque<Result<ModelResponse, ModelError>>>>,
    fallback: Option<ModelResponse>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<ModelResponse, ModelError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            ..Default::default()
        }
    }

    pub fn answers(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(ModelResponse::text(*t))).collect())
    }

    pub fn repeating(response: ModelResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests").clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.requests.lock().expect("requests").push(request);
        let next = self.responses.lock().expect("responses").pop_front();
        match (next, &self.fallback) {
            (Some(result), _) => result,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(ModelError::invalid_response("scripted", "script exhausted")),
        }
    }
}

/// Returns one record per employee name contained in the query.
pub struct StaticSearch {
    pub records: Vec<(&'static str, &'static str)>,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl StaticSearch {
    pub fn hr() -> Self {
        Self {
            records: vec![
                ("Dana", "Dana Reyes, payroll lead, joined 2019"),
                ("Sam", "Sam Okafor, recruiter, joined 2021"),
            ],
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DocumentSearch for StaticSearch {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, SearchError> {
        self.queries
            .lock()
            .expect("queries")
            .push((query.to_string(), k));
        Ok(self
            .records
            .iter()
            .filter(|(name, _)| query.contains(name))
            .take(k)
            .map(|(name, content)| {
                let mut metadata = Map::new();
                metadata.insert("name".into(), json!(name));
                ScoredDocument {
                    document: Document {
                        page_content: content.to_string(),
                        metadata,
                    },
                    score: 0.87,
                }
            })
            .collect())
    }
}

pub fn lookup_registry(search: Arc<StaticSearch>) -> Arc<ToolRegistry> {
    let tool = EmployeeLookupTool::new(search, 10);
    Arc::new(
        ToolRegistry::new()
            .with_tool(Arc::new(tool))
            .expect("registry"),
    )
}

pub fn lookup_call(id: &str, query: &str) -> ModelResponse {
    ModelResponse::with_tool_calls(
        "",
        vec![ToolCall::new(id, EMPLOYEE_LOOKUP, json!({"query": query}))],
    )
}
