use super::error::{RegistryError, ToolError};
use super::tool::{Tool, ToolSpec};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

struct RegisteredTool {
    tool: Arc<dyn Tool>,
    spec: ToolSpec,
    validator: jsonschema::Validator,
}

/// Named tools with their compiled argument schemas.
///
/// Registration order is kept so rendered tool lists are stable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        let parameters = tool.argument_schema();
        let validator =
            jsonschema::Validator::new(&parameters).map_err(|e| RegistryError::InvalidSchema {
                tool: name.clone(),
                reason: e.to_string(),
            })?;
        let spec = ToolSpec {
            name: name.clone(),
            description: tool.description().to_string(),
            parameters,
        };

        debug!(tool = name.as_str(), "Registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(RegisteredTool {
            tool,
            spec,
            validator,
        });
        Ok(())
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, RegistryError> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.entry(name).map(|entry| Arc::clone(&entry.tool))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|entry| entry.spec.clone()).collect()
    }

    /// Comma-separated tool names for the system instruction.
    pub fn tool_names(&self) -> String {
        self.tools
            .iter()
            .map(|entry| entry.spec.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Checks `arguments` against the tool's schema.
    pub fn validate(&self, name: &str, arguments: &Value) -> Result<(), ToolError> {
        let entry = self
            .entry(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        if entry.validator.is_valid(arguments) {
            return Ok(());
        }
        let errors: Vec<String> = entry
            .validator
            .iter_errors(arguments)
            .map(|e| e.to_string())
            .collect();
        Err(ToolError::invalid_arguments(name, errors.join("; ")))
    }

    /// Looks up, validates and runs a tool.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        self.validate(name, &arguments)?;
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.invoke(arguments).await
    }

    fn entry(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo {
        name: &'static str,
        schema: Value,
    }

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Echoes its arguments"
        }

        fn argument_schema(&self) -> Value {
            self.schema.clone()
        }

        async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
            Ok(arguments)
        }
    }

    fn echo(name: &'static str) -> Arc<dyn Tool> {
        Arc::new(Echo {
            name,
            schema: json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }),
        })
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("echo")).expect("first");
        let err = registry.register(echo("echo")).expect_err("duplicate");
        assert!(matches!(err, RegistryError::Duplicate(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn broken_schema_is_rejected() {
        let tool = Arc::new(Echo {
            name: "bad",
            schema: json!({"type": "not-a-type"}),
        });
        let err = ToolRegistry::new().with_tool(tool).err().expect("invalid");
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));
    }

    #[test]
    fn names_keep_registration_order() {
        let registry = ToolRegistry::new()
            .with_tool(echo("b"))
            .and_then(|r| r.with_tool(echo("a")))
            .expect("registry");
        assert_eq!(registry.tool_names(), "b, a");
        let specs = registry.specs();
        assert_eq!(specs[0].name, "b");
        assert_eq!(specs[1].description, "Echoes its arguments");
    }

    #[tokio::test]
    async fn invoke_validates_before_running() {
        let registry = ToolRegistry::new().with_tool(echo("echo")).expect("registry");

        let ok = registry.invoke("echo", json!({"text": "hi"})).await;
        assert_eq!(ok, Ok(json!({"text": "hi"})));

        let invalid = registry.invoke("echo", json!({"text": 5})).await;
        assert!(matches!(invalid, Err(ToolError::InvalidArguments { .. })));

        let missing = registry.invoke("nope", json!({})).await;
        assert_eq!(missing, Err(ToolError::UnknownTool("nope".into())));
    }
}
