//! Todoist MCP Library
//!
//! MCP tools for Todoist, built from declarative operation configurations.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use todoist_mcp::{Config, TodoistMcpServer};
//!
//! let server = TodoistMcpServer::from_config(&Config::load()?)?;
//! // Serve via stdio, or call tools in-process through EmbeddableMcp
//! ```
//!
//! # Features
//! - Tasks: list, get, batch create/update/close/reopen/delete, move, completed
//! - Projects: list, get, batch create/update/delete, move, collaborators
//! - Sections, labels (personal and shared) and comments
//! - `projects_list` prompt with a markdown overview of projects and sections
//!
//! Batch tools accept either an ID or a name per item and report one
//! success or failure per item.

pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod prompts;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod server;
pub mod tools;


pub use config::{ApiConfig, Config, ConfigError};
pub use error::{BuildError, HandlerError, HandlerResult};
pub use gateway::{Gateway, GatewayError, SyncCommand, TodoistClient};
pub use registry::{ToolHandler, ToolOutput, ToolRegistry};

// Re-export main server type
pub use server::TodoistMcpServer;
