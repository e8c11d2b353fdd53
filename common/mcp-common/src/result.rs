//! Result helpers for MCP tool responses
//!
//! Tool output is always a single text content item. Successful payloads are
//! pretty-printed JSON; failures carry `is_error: true` so the protocol
//! channel itself never breaks because a tool failed.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

/// Render any serializable value as a pretty-printed JSON text result
///
/// `None` / unit-like values serialize as `null`, which is what callers see
/// for remote endpoints answering `204 No Content`.
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(
        json.trim().to_string(),
    )]))
}

/// Plain text result
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Text result flagged with `is_error: true`
pub fn text_error(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn first_text(result: &CallToolResult) -> String {
        result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_json_success_pretty_prints() {
        let result = json_success(&json!({"id": "1"})).unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(first_text(&result), "{\n  \"id\": \"1\"\n}");
    }

    #[test]
    fn test_json_success_null() {
        let result = json_success(&serde_json::Value::Null).unwrap();
        assert_eq!(first_text(&result), "null");
    }

    #[test]
    fn test_text_error_sets_flag() {
        let result = text_error("Error: nope");
        assert_eq!(result.is_error, Some(true));
        assert_eq!(first_text(&result), "Error: nope");
    }

    #[test]
    fn test_text_success() {
        let result = text_success("ok");
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 1);
    }
}
