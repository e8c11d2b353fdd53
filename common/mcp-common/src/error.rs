//! Error conversion helpers for MCP servers
//!
//! Tool handlers report protocol-level failures as [`McpError`]. The
//! [`IntoMcpError`] trait lets domain error types take part in `?` through
//! [`ResultExt::to_mcp_err`].

use rmcp::ErrorData as McpError;

/// Type alias for MCP tool results
pub type McpResult<T> = Result<T, McpError>;

/// Conversion of a domain error into an MCP protocol error
pub trait IntoMcpError {
    fn into_mcp_error(self) -> McpError;
}

impl IntoMcpError for std::io::Error {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(format!("IO error: {}", self), None)
    }
}

impl IntoMcpError for serde_json::Error {
    fn into_mcp_error(self) -> McpError {
        McpError::invalid_params(format!("JSON error: {}", self), None)
    }
}

impl IntoMcpError for anyhow::Error {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(format!("{:#}", self), None)
    }
}

impl IntoMcpError for String {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(self, None)
    }
}

/// `?`-friendly conversion for any `Result` whose error implements [`IntoMcpError`]
///
/// ```rust,ignore
/// let args = serde_json::from_value::<Params>(raw).to_mcp_err()?;
/// ```
pub trait ResultExt<T> {
    fn to_mcp_err(self) -> McpResult<T>;
}

impl<T, E: IntoMcpError> ResultExt<T> for Result<T, E> {
    fn to_mcp_err(self) -> McpResult<T> {
        self.map_err(IntoMcpError::into_mcp_error)
    }
}

/// Create an internal error with a message
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

/// Create an invalid params error with a message
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_invalid_params() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err = parse.to_mcp_err().unwrap_err();
        assert!(err.message.contains("JSON error"));
        assert_eq!(err.code.0, rmcp::model::ErrorCode::INVALID_PARAMS.0);
    }

    #[test]
    fn test_anyhow_keeps_context_chain() {
        let err = anyhow::anyhow!("root cause").context("loading config");
        let mcp = err.into_mcp_error();
        assert!(mcp.message.contains("loading config"));
        assert!(mcp.message.contains("root cause"));
    }

    #[test]
    fn test_helpers() {
        assert!(internal_error("boom").message.contains("boom"));
        assert!(invalid_params("bad param").message.contains("bad param"));
    }
}
