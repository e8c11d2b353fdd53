//! Remote API gateway
//!
//! [`Gateway`] is the only way handlers reach Todoist. The production
//! implementation is [`TodoistClient`]; tests substitute an in-memory double.

pub mod client;
pub mod error;

pub use client::TodoistClient;
pub use error::{GatewayError, GatewayResult};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A single command for the Sync API command queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncCommand {
    #[serde(rename = "type")]
    pub command_type: String,
    /// Fresh per command; Todoist uses it to acknowledge each command
    pub uuid: String,
    pub args: Map<String, Value>,
}

impl SyncCommand {
    pub fn new(command_type: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            command_type: command_type.into(),
            uuid: Uuid::new_v4().to_string(),
            args,
        }
    }
}

/// Primitive operations against the Todoist REST and Sync surfaces
///
/// Every operation resolves to the parsed JSON body, or `Value::Null` for
/// `204 No Content`.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// GET `path` on the REST surface. Falsy query values are dropped.
    async fn get(&self, path: &str, query: &Map<String, Value>) -> GatewayResult<Value>;

    /// POST `body` as JSON to `path` on the REST surface
    async fn post(&self, path: &str, body: &Map<String, Value>) -> GatewayResult<Value>;

    /// DELETE `path` on the REST surface
    async fn delete(&self, path: &str) -> GatewayResult<Value>;

    /// Submit commands to the Sync API command queue in one request
    async fn sync(&self, commands: &[SyncCommand]) -> GatewayResult<Value>;

    /// Query the completed-items surface with form-encoded parameters
    async fn completed(&self, params: &Map<String, Value>) -> GatewayResult<Value>;
}

/// Flatten a parameter map into string pairs for query strings and forms
///
/// `null`, `false`, `0` and empty strings mean "not set" for this API and are
/// omitted. Arrays are joined with commas.
pub fn encode_params(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let encoded = match value {
                Value::Null => return None,
                Value::Bool(false) => return None,
                Value::Bool(true) => "true".to_string(),
                Value::Number(n) if n.as_f64() == Some(0.0) => return None,
                Value::Number(n) => n.to_string(),
                Value::String(s) if s.is_empty() => return None,
                Value::String(s) => s.clone(),
                Value::Array(items) if items.is_empty() => return None,
                Value::Array(items) => items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
                Value::Object(_) => value.to_string(),
            };
            Some((key.clone(), encoded))
        })
        .collect()
}
