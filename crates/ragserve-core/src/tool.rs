//! Tool trait and registry
//!
//! Tools are dispatched through an explicit name -> handler registry with a
//! JSON-schema descriptor per tool, rather than any runtime introspection.
//! A tool never fails the agent loop: errors are folded into the returned
//! string so the agent can react to them in-conversation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

/// Wire-level description of a callable tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's arguments object
    pub parameters: serde_json::Value,
}

/// A named function the agent may invoke mid-turn
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema describing the arguments object
    fn parameters(&self) -> serde_json::Value;

    /// Run the tool. Failures are reported inside the returned string.
    async fn invoke(&self, arguments: serde_json::Value) -> String;
}

/// Registry mapping tool names to handlers
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Invoke a tool by name with already-parsed JSON arguments
    pub async fn invoke(&self, name: &str, arguments: serde_json::Value) -> String {
        match self.tools.get(name) {
            Some(tool) => tool.invoke(arguments).await,
            None => format!("Unknown tool '{name}'."),
        }
    }

    /// Schemas for every registered tool, in stable name order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .values()
            .map(|tool| ToolSchema {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its input back"
        }

        fn parameters(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }

        async fn invoke(&self, arguments: serde_json::Value) -> String {
            arguments
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        }
    }

    #[tokio::test]
    async fn test_registry_dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let result = registry.invoke("echo", json!({"text": "hello"})).await;
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn test_registry_reports_unknown_tool() {
        let registry = ToolRegistry::new();
        let result = registry.invoke("missing", json!({})).await;
        assert!(result.contains("Unknown tool"));
    }

    #[test]
    fn test_registry_schemas() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let schemas = registry.schemas();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].name, "echo");
        assert_eq!(schemas[0].parameters["type"], "object");
    }
}
