use super::error::ToolError;
use super::search::DocumentSearch;
use super::tool::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

pub const EMPLOYEE_LOOKUP: &str = "employee_lookup";

#[derive(Debug, Deserialize)]
struct LookupArgs {
    query: String,
    n: Option<usize>,
}

/// Retrieves HR records similar to a free-text query.
pub struct EmployeeLookupTool {
    search: Arc<dyn DocumentSearch>,
    default_results: usize,
}

impl EmployeeLookupTool {
    pub fn new(search: Arc<dyn DocumentSearch>, default_results: usize) -> Self {
        Self {
            search,
            default_results: default_results.max(1),
        }
    }
}

#[async_trait]
impl Tool for EmployeeLookupTool {
    fn name(&self) -> &str {
        EMPLOYEE_LOOKUP
    }

    fn description(&self) -> &str {
        "Gathers employee details from the HR table"
    }

    fn argument_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "n": {
                    "type": "integer",
                    "minimum": 1,
                    "default": self.default_results,
                    "description": "Number of results to return"
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: LookupArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(EMPLOYEE_LOOKUP, e.to_string()))?;
        let k = args.n.unwrap_or(self.default_results);
        debug!(query = args.query.as_str(), k, "Running employee lookup");

        let results = self
            .search
            .similarity_search(&args.query, k)
            .await
            .map_err(|e| ToolError::execution_failed(EMPLOYEE_LOOKUP, e.to_string()))?;
        serde_json::to_value(results)
            .map_err(|e| ToolError::execution_failed(EMPLOYEE_LOOKUP, e.to_string()))
    }
}
