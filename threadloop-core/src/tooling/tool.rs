use super::error::ToolError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// A capability the model can invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema the arguments must satisfy.
    fn argument_schema(&self) -> Value;

    /// Runs the tool. Arguments have already passed schema validation.
    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError>;
}

/// Declaration of a tool as presented to the model.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    #[schema(value_type = Object)]
    pub parameters: Value,
}
