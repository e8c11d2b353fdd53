//! Generic handler constructors
//!
//! Tools are not written one by one. Each is described by a static
//! configuration and turned into a [`ToolHandler`](crate::registry::ToolHandler)
//! by one of three constructors:
//!
//! - [`single`] - one validated request per call
//! - [`batch`] - an `items` array, one request per item, run concurrently
//! - [`sync`] - an `items` array folded into one Sync API command batch

pub mod batch;
pub mod outcome;
pub mod single;
pub mod sync;

pub use batch::{BatchHandler, BatchOpConfig};
pub use outcome::{BatchResponse, ItemOutcome, Summary};
pub use single::{ApiHandler, SingleOpConfig};
pub use sync::{SyncBatchHandler, SyncOpConfig};

use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::error::{HandlerError, HandlerResult};
use crate::gateway::Gateway;
use crate::resolve::NameMatcher;

/// HTTP verb used for a REST operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// What a batch operation does to each item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    Read,
    Create,
    Update,
    Delete,
}

impl OpMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpMode::Read => "read",
            OpMode::Create => "create",
            OpMode::Update => "update",
            OpMode::Delete => "delete",
        }
    }
}

/// Location of a batch operation's resource
///
/// Either a full template (`/tasks/{id}`) or a base path plus a suffix
/// (`/tasks` + `/{id}/close`). Exactly one form exists per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpPath {
    Full(String),
    Split { base: String, suffix: String },
}

impl OpPath {
    pub fn full(path: impl Into<String>) -> Self {
        OpPath::Full(path.into())
    }

    pub fn split(base: impl Into<String>, suffix: impl Into<String>) -> Self {
        OpPath::Split {
            base: base.into(),
            suffix: suffix.into(),
        }
    }

    /// Collection path used to fetch candidates for name lookup
    ///
    /// `/tasks/{id}` becomes `/tasks`.
    pub fn list_path(&self) -> &str {
        match self {
            OpPath::Full(path) => path.split("/{").next().unwrap_or(path),
            OpPath::Split { base, .. } => base,
        }
    }

    /// Path addressed when creating a resource
    pub fn create_path(&self) -> &str {
        match self {
            OpPath::Full(path) => path,
            OpPath::Split { base, .. } => base,
        }
    }

    /// Path for one resource, with `{id}` substituted
    pub fn item_path(&self, id: &str) -> String {
        match self {
            OpPath::Full(path) => path.replace("{id}", id),
            OpPath::Split { base, suffix } => format!("{}{}", base, suffix.replace("{id}", id)),
        }
    }
}

/// Per-item check run before any remote call
pub trait ItemValidator: Send + Sync {
    fn validate(&self, item: &Map<String, Value>) -> Result<(), String>;
}

impl<F> ItemValidator for F
where
    F: Fn(&Map<String, Value>) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, item: &Map<String, Value>) -> Result<(), String> {
        self(item)
    }
}

/// Builds Sync API command arguments for a resolved item
pub trait CommandArgsBuilder: Send + Sync {
    fn build(&self, item: &Map<String, Value>, id: &str) -> Map<String, Value>;
}

impl<F> CommandArgsBuilder for F
where
    F: Fn(&Map<String, Value>, &str) -> Map<String, Value> + Send + Sync,
{
    fn build(&self, item: &Map<String, Value>, id: &str) -> Map<String, Value> {
        self(item, id)
    }
}

/// Replaces the default query/body extraction of a single operation
pub trait ParamTransform: Send + Sync {
    fn transform(&self, args: &Map<String, Value>) -> Map<String, Value>;
}

impl<F> ParamTransform for F
where
    F: Fn(&Map<String, Value>) -> Map<String, Value> + Send + Sync,
{
    fn transform(&self, args: &Map<String, Value>) -> Map<String, Value> {
        self(args)
    }
}

/// Post-processes the parsed result of a single operation
pub trait ResultProcessor: Send + Sync {
    fn process(&self, result: Value, args: &Map<String, Value>) -> Value;
}

impl<F> ResultProcessor for F
where
    F: Fn(Value, &Map<String, Value>) -> Value + Send + Sync,
{
    fn process(&self, result: Value, args: &Map<String, Value>) -> Value {
        self(result, args)
    }
}

/// Keeps the first `limit` entries of a list result, in remote order
///
/// A missing, zero or negative limit falls back to `default`.
#[derive(Debug, Clone)]
pub struct TruncateToLimit {
    pub arg: &'static str,
    pub default: usize,
}

impl ResultProcessor for TruncateToLimit {
    fn process(&self, result: Value, args: &Map<String, Value>) -> Value {
        let limit = args
            .get(self.arg)
            .and_then(Value::as_f64)
            .filter(|n| *n > 0.0)
            .map(|n| n as usize)
            .unwrap_or(self.default);

        match result {
            Value::Array(items) => Value::Array(items.into_iter().take(limit).collect()),
            other => other,
        }
    }
}

/// Name-based lookup settings for a batch operation
#[derive(Clone)]
pub struct NameLookup {
    /// Item field carrying the search term
    pub field: String,
    pub matcher: Arc<dyn NameMatcher>,
}

impl NameLookup {
    pub fn new(field: impl Into<String>, matcher: impl NameMatcher + 'static) -> Self {
        Self {
            field: field.into(),
            matcher: Arc::new(matcher),
        }
    }
}

impl fmt::Debug for NameLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameLookup")
            .field("field", &self.field)
            .field("matches_on", &self.matcher.display_field())
            .finish()
    }
}

/// `{name}` placeholders of a path template, left to right
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                names.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}

/// Reject path values that could escape the intended resource path
pub fn check_path_value(param: &str, value: &str) -> HandlerResult<()> {
    if value.contains('/') || value.contains('\\') || value.contains("..") {
        return Err(HandlerError::PathTraversal(param.to_string()));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
    if value.is_empty() || !value.chars().all(allowed) {
        return Err(HandlerError::InvalidPathParam(param.to_string()));
    }
    Ok(())
}

/// Issue exactly one REST call for `method`
pub(crate) async fn call_rest(
    gateway: &dyn Gateway,
    method: HttpMethod,
    path: &str,
    params: &Map<String, Value>,
) -> HandlerResult<Value> {
    let result = match method {
        HttpMethod::Get => gateway.get(path, params).await?,
        HttpMethod::Post => gateway.post(path, params).await?,
        HttpMethod::Delete => gateway.delete(path).await?,
    };
    Ok(result)
}

/// Wrap an item schema into the `{ items: [...] }` schema of a batch tool
pub(crate) fn batch_input_schema(item_schema: Map<String, Value>) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert(
        "properties".into(),
        json!({
            "items": {
                "type": "array",
                "items": Value::Object(item_schema),
            }
        }),
    );
    schema.insert("required".into(), json!(["items"]));
    schema
}

/// Pull the `items` array out of batch arguments
pub(crate) fn batch_items(args: &Value) -> HandlerResult<Vec<Value>> {
    let items = args
        .get("items")
        .ok_or_else(|| HandlerError::Validation("'items' is required".into()))?;
    let items = items
        .as_array()
        .ok_or_else(|| HandlerError::Validation("'items' must be an array".into()))?;
    if let Some(position) = items.iter().position(|item| !item.is_object()) {
        return Err(HandlerError::Validation(format!(
            "'items[{}]' must be an object",
            position
        )));
    }
    Ok(items.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(
            placeholders("/projects/{project_id}/sections/{id}"),
            vec!["project_id", "id"]
        );
        assert!(placeholders("/tasks").is_empty());
        assert_eq!(placeholders("/broken/{id"), Vec::<&str>::new());
    }

    #[test]
    fn test_check_path_value() {
        assert!(check_path_value("id", "6X7rM8997g3RQmvh").is_ok());
        assert!(check_path_value("id", "abc_DEF-123").is_ok());
        assert!(matches!(
            check_path_value("id", "../secrets"),
            Err(HandlerError::PathTraversal(_))
        ));
        assert!(matches!(
            check_path_value("id", "a/b"),
            Err(HandlerError::PathTraversal(_))
        ));
        assert!(matches!(
            check_path_value("id", "a\\b"),
            Err(HandlerError::PathTraversal(_))
        ));
        assert!(matches!(
            check_path_value("id", "a?b=c"),
            Err(HandlerError::InvalidPathParam(_))
        ));
        assert!(matches!(
            check_path_value("id", ""),
            Err(HandlerError::InvalidPathParam(_))
        ));
    }

    #[test]
    fn test_op_path_forms() {
        let full = OpPath::full("/tasks/{id}");
        assert_eq!(full.list_path(), "/tasks");
        assert_eq!(full.item_path("42"), "/tasks/42");
        assert_eq!(full.create_path(), "/tasks/{id}");

        let split = OpPath::split("/tasks", "/{id}/close");
        assert_eq!(split.list_path(), "/tasks");
        assert_eq!(split.item_path("42"), "/tasks/42/close");
        assert_eq!(split.create_path(), "/tasks");

        assert_eq!(OpPath::full("/labels").list_path(), "/labels");
    }

    #[test]
    fn test_truncate_to_limit() {
        let processor = TruncateToLimit {
            arg: "limit",
            default: 2,
        };
        let result = json!([1, 2, 3, 4, 5]);

        let mut args = Map::new();
        assert_eq!(processor.process(result.clone(), &args), json!([1, 2]));

        args.insert("limit".into(), json!(4));
        assert_eq!(processor.process(result.clone(), &args), json!([1, 2, 3, 4]));

        args.insert("limit".into(), json!(0));
        assert_eq!(processor.process(result, &args), json!([1, 2]));

        assert_eq!(processor.process(json!({"a": 1}), &args), json!({"a": 1}));
    }

    #[test]
    fn test_batch_items_validation() {
        assert!(matches!(
            batch_items(&json!({})),
            Err(HandlerError::Validation(_))
        ));
        assert!(matches!(
            batch_items(&json!({"items": {}})),
            Err(HandlerError::Validation(_))
        ));
        let err = batch_items(&json!({"items": [{}, 3]})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid arguments: 'items[1]' must be an object");
        assert_eq!(batch_items(&json!({"items": [{"id": "1"}]})).unwrap().len(), 1);
    }
}
