//! Per-item outcomes and the aggregated batch response

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::gateway::SyncCommand;

/// Result of processing one batch item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// An existing resource was read or mutated
    Resolved {
        id: String,
        result: Value,
        found_by_name: Option<String>,
        matched_content: Option<Value>,
    },
    /// A new resource was created
    Created { created_item: Value },
    /// A command was accepted into the Sync API queue
    Queued {
        id: String,
        command: SyncCommand,
        found_by_name: Option<String>,
    },
    /// Validation, resolution, or transport failure
    Failed { error: String, item: Value },
}

impl ItemOutcome {
    pub fn failed(error: impl Into<String>, item: &Value) -> Self {
        ItemOutcome::Failed {
            error: error.into(),
            item: item.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ItemOutcome::Failed { .. })
    }
}

impl Serialize for ItemOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("success", &self.is_success())?;
        match self {
            ItemOutcome::Resolved {
                id,
                result,
                found_by_name,
                matched_content,
            } => {
                map.serialize_entry("id", id)?;
                map.serialize_entry("result", result)?;
                if let Some(name) = found_by_name {
                    map.serialize_entry("found_by_name", name)?;
                    map.serialize_entry("matched_content", matched_content)?;
                }
            }
            ItemOutcome::Created { created_item } => {
                map.serialize_entry("created_item", created_item)?;
            }
            ItemOutcome::Queued {
                id,
                command,
                found_by_name,
            } => {
                map.serialize_entry("id", id)?;
                map.serialize_entry("command", command)?;
                if let Some(name) = found_by_name {
                    map.serialize_entry("found_by_name", name)?;
                }
            }
            ItemOutcome::Failed { error, item } => {
                map.serialize_entry("error", error)?;
                map.serialize_entry("item", item)?;
            }
        }
        map.end()
    }
}

/// Item counts for a batch call
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Aggregate returned by the batch and sync-batch handlers
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BatchResponse {
    /// True iff every item succeeded
    pub success: bool,
    pub summary: Summary,
    pub results: Vec<ItemOutcome>,
    /// Raw Sync API reply; only present for sync-batch tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_result: Option<Value>,
}

impl BatchResponse {
    pub fn from_outcomes(results: Vec<ItemOutcome>) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let total = results.len();
        Self {
            success: succeeded == total,
            summary: Summary {
                total,
                succeeded,
                failed: total - succeeded,
            },
            results,
            sync_result: None,
        }
    }

    pub fn with_sync_result(mut self, sync_result: Value) -> Self {
        self.sync_result = Some(sync_result);
        self
    }
}
