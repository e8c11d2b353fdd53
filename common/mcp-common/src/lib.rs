//! MCP Common - shared plumbing for MCP servers
//!
//! - **Initialization**: [`init_tracing`] routes logs to stderr
//! - **Results**: helpers producing single-text-item `CallToolResult`s
//! - **Errors**: conversion of domain errors into MCP protocol errors
//! - **Embeddable**: [`EmbeddableMcp`] for in-process tool execution

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{internal_error, invalid_params, IntoMcpError, McpResult, ResultExt};
pub use init::{init_tracing, LogFormat};
pub use result::{json_success, text_error, text_success};

pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

pub use async_trait::async_trait;
