//! Error types for tool handlers

use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors raised while executing a tool
///
/// In batch handlers these are captured per item; everywhere else they end
/// the call and are rendered as an error payload by the registry.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Arguments did not match the tool's schema
    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("Path parameter {0} is required but not provided")]
    MissingPathParam(String),

    /// Value contains `/`, `\` or `..`
    #[error("Invalid characters in path parameter '{0}': Path traversal characters are not allowed")]
    PathTraversal(String),

    #[error("Invalid path parameter '{0}': Only alphanumeric characters, underscores, and hyphens are allowed")]
    InvalidPathParam(String),

    /// A name lookup found nothing, or no identifier was supplied
    #[error("{0}")]
    Resolution(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for handler operations
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Errors detected while assembling operation configurations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("tool '{tool}': mode {mode} requires an identifier field")]
    MissingIdField { tool: String, mode: &'static str },

    #[error("tool '{tool}': path parameter '{param}' is not declared in the schema")]
    UndeclaredPathParam { tool: String, param: String },

    #[error("tool '{tool}': field '{field}' is not declared in the schema")]
    UndeclaredField { tool: String, field: String },

    #[error("tool '{0}' is registered twice")]
    DuplicateTool(String),
}
