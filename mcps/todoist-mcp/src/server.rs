//! MCP server implementation
//!
//! The tool set is data-driven (see [`crate::tools`]), so `ServerHandler` is
//! implemented by hand on top of the [`ToolRegistry`] instead of through the
//! `#[tool_router]` macros.

use async_trait::async_trait;
use mcp_common::{
    invalid_params, CallToolResult, EmbeddableError, EmbeddableMcp, EmbeddableResult,
    IntoMcpError, McpError, ResultExt, Tool,
};
use rmcp::{
    model::{
        CallToolRequestParam, GetPromptRequestParam, GetPromptResult, ListPromptsResult,
        ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    RoleServer, ServerHandler,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::error::BuildError;
use crate::gateway::{Gateway, GatewayError, TodoistClient};
use crate::prompts;
use crate::registry::ToolRegistry;
use crate::tools;

/// The Todoist MCP Server
#[derive(Clone)]
pub struct TodoistMcpServer {
    registry: Arc<ToolRegistry>,
    gateway: Arc<dyn Gateway>,
}

impl TodoistMcpServer {
    /// Build a server talking to the real Todoist API
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = TodoistClient::new(&config.api)?;
        Ok(Self::with_gateway(Arc::new(client))?)
    }

    /// Build a server on top of any gateway
    pub fn with_gateway(gateway: Arc<dyn Gateway>) -> Result<Self, BuildError> {
        let mut registry = ToolRegistry::new();
        tools::register_all(&mut registry, gateway.clone())?;
        tracing::debug!(tools = registry.len(), "tool catalog registered");

        Ok(Self {
            registry: Arc::new(registry),
            gateway,
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl IntoMcpError for GatewayError {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(self.to_string(), None)
    }
}

impl ServerHandler for TodoistMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Todoist MCP Server - manage Todoist tasks, projects, sections, labels and \
                 comments. Mutating tools take an 'items' array and report per-item results; \
                 most accept a name instead of an ID. Use the 'projects_list' prompt for an \
                 overview of project and section IDs."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(self.registry.tools())))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            let args = request.arguments.map(Value::Object).unwrap_or(Value::Null);
            self.registry.dispatch(&request.name, args).await
        }
    }

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListPromptsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListPromptsResult::with_all_items(prompts::prompts())))
    }

    fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<GetPromptResult, McpError>> + Send + '_ {
        async move {
            tracing::info!(prompt = %request.name, "prompt requested");
            match &*request.name {
                prompts::PROJECTS_LIST => prompts::projects_list(self.gateway.as_ref())
                    .await
                    .to_mcp_err(),
                other => Err(invalid_params(format!("Unknown prompt: {}", other))),
            }
        }
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for TodoistMcpServer {
    fn server_name(&self) -> &str {
        "todoist"
    }

    fn server_description(&self) -> Option<&str> {
        Some("Todoist MCP Server - batch task, project, section, label and comment management")
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.registry.tools()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        if !self.registry.contains(name) {
            return Err(EmbeddableError::ToolNotFound(name.to_string()));
        }
        if !(params.is_object() || params.is_null()) {
            return Err(EmbeddableError::InvalidParams(
                "tool arguments must be a JSON object".into(),
            ));
        }
        Ok(self.registry.dispatch(name, params).await?)
    }

    fn server_version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::FakeGateway;
    use serde_json::json;

    fn server(gateway: Arc<FakeGateway>) -> TodoistMcpServer {
        TodoistMcpServer::with_gateway(gateway).unwrap()
    }

    #[test]
    fn test_server_info_enables_tools_and_prompts() {
        let info = server(FakeGateway::new()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_some());
        assert!(info.instructions.unwrap_or_default().contains("projects_list"));
    }

    #[test]
    fn test_embeddable_metadata() {
        let server = server(FakeGateway::new());
        assert_eq!(server.server_name(), "todoist");
        assert!(server.server_description().is_some());
        assert_eq!(
            EmbeddableMcp::list_tools(&server).len(),
            server.registry().len()
        );
    }

    #[tokio::test]
    async fn test_embedded_call_reaches_gateway() {
        let gateway = FakeGateway::new().respond_get("/labels", json!([{"id": "1"}]));
        let server = server(gateway.clone());

        let result = EmbeddableMcp::call_tool(&server, "get_labels", json!({}))
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_embedded_unknown_tool() {
        let server = server(FakeGateway::new());
        let result = EmbeddableMcp::call_tool(&server, "missing", json!({})).await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_embedded_rejects_non_object_params() {
        let server = server(FakeGateway::new());
        let result = EmbeddableMcp::call_tool(&server, "get_labels", json!([1])).await;
        assert!(matches!(result, Err(EmbeddableError::InvalidParams(_))));
    }
}
