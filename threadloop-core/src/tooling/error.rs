use thiserror::Error;

/// Failures of a single tool call.
///
/// None of these end an agent invocation; the execution step turns them
/// into error-bearing tool results the model can react to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error("tool '{tool}' failed: {reason}")]
    ExecutionFailed { tool: String, reason: String },
}

impl ToolError {
    pub fn invalid_arguments(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn execution_failed(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Text placed in the tool result the model sees.
    pub fn to_tool_content(&self) -> String {
        format!("Error: {self}. Please fix your mistakes.")
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a tool named '{0}' is already registered")]
    Duplicate(String),
    #[error("argument schema of tool '{tool}' is not a valid JSON Schema: {reason}")]
    InvalidSchema { tool: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("document search request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("document search returned an invalid response: {0}")]
    InvalidResponse(String),
}
