//! Tool registry and dispatcher
//!
//! Maps tool names to handlers and turns every handler outcome into a
//! `CallToolResult`. Nothing a handler does can fail the protocol request
//! itself; failures come back as text payloads with `is_error` set.

use async_trait::async_trait;
use mcp_common::{json_success, text_error, text_success, CallToolResult, McpError, Tool};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{BuildError, HandlerError, HandlerResult};

/// What a handler produced, before rendering
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Rendered as pretty-printed JSON
    Json(Value),
    /// Rendered verbatim
    Text(String),
}

/// A callable tool
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Description advertised in the tool list
    fn full_description(&self) -> String {
        self.description().to_string()
    }

    /// JSON schema of the tool arguments
    fn input_schema(&self) -> Map<String, Value>;

    async fn call(&self, args: Value) -> HandlerResult<ToolOutput>;
}

/// Name-indexed collection of tool handlers, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn ToolHandler>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), BuildError> {
        let name = handler.name().to_string();
        if self.index.contains_key(&name) {
            return Err(BuildError::DuplicateTool(name));
        }
        self.index.insert(name, self.handlers.len());
        self.handlers.push(handler);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Protocol tool descriptors for every registered handler
    pub fn tools(&self) -> Vec<Tool> {
        self.handlers
            .iter()
            .map(|handler| {
                Tool::new(
                    handler.name().to_string(),
                    handler.full_description(),
                    Arc::new(handler.input_schema()),
                )
            })
            .collect()
    }

    /// Run a tool and render its outcome
    ///
    /// Only a failure to serialize a successful result escapes as `Err`.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<CallToolResult, McpError> {
        let Some(handler) = self.index.get(name).map(|&i| &self.handlers[i]) else {
            warn!(tool = %name, "unknown tool requested");
            return Ok(text_error(format!(
                "Error: {}",
                HandlerError::UnknownTool(name.to_string())
            )));
        };

        info!(tool = %name, "calling tool");
        // Absent arguments are treated as an empty object
        let args = match args {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        match handler.call(args).await {
            Ok(ToolOutput::Json(value)) => json_success(&value),
            Ok(ToolOutput::Text(text)) => Ok(text_success(text)),
            Err(e) => {
                warn!(tool = %name, error = %e, "tool failed");
                Ok(text_error(format!("Error executing tool '{}': {}", name, e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo {
        name: &'static str,
    }

    #[async_trait]
    impl ToolHandler for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Echo the arguments"
        }

        fn input_schema(&self) -> Map<String, Value> {
            json!({"type": "object"}).as_object().cloned().unwrap()
        }

        async fn call(&self, args: Value) -> HandlerResult<ToolOutput> {
            match args.get("fail") {
                Some(_) => Err(HandlerError::Validation("fail requested".into())),
                None => Ok(ToolOutput::Json(args)),
            }
        }
    }

    fn text(result: &CallToolResult) -> String {
        result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo { name: "echo" })).unwrap();
        registry
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = registry();
        let err = registry.register(Arc::new(Echo { name: "echo" })).unwrap_err();
        assert_eq!(err, BuildError::DuplicateTool("echo".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_tools_carry_schema() {
        let tools = registry().tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "echo");
        assert_eq!(tools[0].input_schema.get("type"), Some(&json!("object")));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_payload() {
        let result = registry().dispatch("nope", json!({})).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text(&result), "Error: Unknown tool: nope");
    }

    #[tokio::test]
    async fn test_handler_error_is_rendered() {
        let result = registry()
            .dispatch("echo", json!({"fail": true}))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            text(&result),
            "Error executing tool 'echo': Invalid arguments: fail requested"
        );
    }

    #[tokio::test]
    async fn test_success_is_pretty_json() {
        let result = registry().dispatch("echo", json!({"a": 1})).await.unwrap();
        assert_ne!(result.is_error, Some(true));
        assert_eq!(text(&result), "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn test_null_args_become_empty_object() {
        let result = registry().dispatch("echo", Value::Null).await.unwrap();
        assert_eq!(text(&result), "{}");
    }
}
