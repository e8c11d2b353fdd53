//! In-process execution of MCP servers
//!
//! [`EmbeddableMcp`] lets a host call a server's tools directly, without a
//! stdio transport in between. Tool-level failures still come back as
//! `CallToolResult` values with `is_error` set; [`EmbeddableError`] is only
//! for failures outside the tool itself.
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//!
//! let server = TodoistMcpServer::from_config(&config)?;
//! let result = server.call_tool("get_projects", serde_json::json!({})).await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

/// Error type for embedded MCP calls
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// No tool registered under this name
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments were not a JSON object
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// MCP protocol error
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err.message.to_string())
    }
}

/// Result type for embedded MCP calls
pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// An MCP server that can be driven in-process
///
/// Implementations must be `Send + Sync`; hosts may issue concurrent calls.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Server name, matching the name used in MCP configuration files
    fn server_name(&self) -> &str;

    /// All tools with their input schemas
    fn list_tools(&self) -> Vec<Tool>;

    /// Execute a tool by name
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    /// One-line summary shown to hosts listing embedded servers
    fn server_description(&self) -> Option<&str> {
        None
    }

    fn server_version(&self) -> Option<&str> {
        None
    }
}
