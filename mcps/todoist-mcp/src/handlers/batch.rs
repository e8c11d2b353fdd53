//! Batch-operation handler constructor
//!
//! A batch tool takes `{ items: [...] }`. Items are validated, resolved and
//! dispatched independently and concurrently; one item failing never stops
//! its siblings. The response lists one outcome per item, in input order.

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::outcome::{BatchResponse, ItemOutcome};
use super::{
    batch_input_schema, batch_items, call_rest, check_path_value, HttpMethod, ItemValidator,
    NameLookup, OpMode, OpPath,
};
use crate::error::{BuildError, HandlerError, HandlerResult};
use crate::gateway::Gateway;
use crate::registry::{ToolHandler, ToolOutput};
use crate::resolve::{find_by_name, id_string};
use crate::schema::ItemSchema;

/// Static description of a batch tool
#[derive(Clone)]
pub struct BatchOpConfig {
    pub name: String,
    pub description: String,
    pub schema: ItemSchema,
    pub method: HttpMethod,
    pub mode: OpMode,
    pub path: OpPath,
    pub id_field: Option<String>,
    pub lookup: Option<NameLookup>,
    pub validator: Option<Arc<dyn ItemValidator>>,
}

impl BatchOpConfig {
    pub fn builder(
        name: impl Into<String>,
        description: impl Into<String>,
        method: HttpMethod,
        path: OpPath,
    ) -> BatchOpConfigBuilder {
        BatchOpConfigBuilder {
            config: BatchOpConfig {
                name: name.into(),
                description: description.into(),
                schema: ItemSchema::empty(),
                method,
                mode: OpMode::Create,
                path,
                id_field: None,
                lookup: None,
                validator: None,
            },
        }
    }

    /// Whether items may identify their target by ID or by name
    pub fn requires_id_or_name(&self) -> bool {
        self.mode != OpMode::Create && self.id_field.is_some() && self.lookup.is_some()
    }

    /// Tool description, with the ID-or-name rule spelled out when it applies
    pub fn full_description(&self) -> String {
        match (&self.id_field, &self.lookup) {
            (Some(id_field), Some(lookup)) if self.requires_id_or_name() => format!(
                "{}\nEither '{}' or the '{}' to identify the target.",
                self.description, id_field, lookup.field
            ),
            _ => self.description.clone(),
        }
    }
}

pub struct BatchOpConfigBuilder {
    config: BatchOpConfig,
}

impl BatchOpConfigBuilder {
    pub fn schema(mut self, schema: ItemSchema) -> Self {
        self.config.schema = schema;
        self
    }

    pub fn mode(mut self, mode: OpMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.config.id_field = Some(field.into());
        self
    }

    pub fn lookup(mut self, lookup: NameLookup) -> Self {
        self.config.lookup = Some(lookup);
        self
    }

    pub fn validator(mut self, validator: impl ItemValidator + 'static) -> Self {
        self.config.validator = Some(Arc::new(validator));
        self
    }

    /// Non-create modes need an identifier field, and every referenced field
    /// must be declared in the item schema
    pub fn build(self) -> Result<BatchOpConfig, BuildError> {
        let config = self.config;

        if config.mode != OpMode::Create && config.id_field.is_none() {
            return Err(BuildError::MissingIdField {
                tool: config.name.clone(),
                mode: config.mode.as_str(),
            });
        }

        let referenced = config
            .id_field
            .iter()
            .chain(config.lookup.as_ref().map(|l| &l.field));
        for field in referenced {
            if !config.schema.has_field(field) {
                return Err(BuildError::UndeclaredField {
                    tool: config.name.clone(),
                    field: field.clone(),
                });
            }
        }

        Ok(config)
    }
}

/// Tool handler running one REST request per item
pub struct BatchHandler {
    config: BatchOpConfig,
    gateway: Arc<dyn Gateway>,
}

impl BatchHandler {
    pub fn new(config: BatchOpConfig, gateway: Arc<dyn Gateway>) -> Self {
        Self { config, gateway }
    }

    fn needs_lookup(&self, item: &Value) -> bool {
        match (&self.config.id_field, &self.config.lookup) {
            (Some(id_field), Some(lookup)) if self.config.mode != OpMode::Create => {
                item.get(id_field).and_then(id_string).is_none()
                    && item.get(&lookup.field).is_some_and(is_present)
            }
            _ => false,
        }
    }

    /// Fetch the candidate pool once for the whole batch
    async fn fetch_pool(&self) -> Result<Vec<Value>, String> {
        let path = self.config.path.list_path();
        debug!(tool = %self.config.name, %path, "fetching candidates for name lookup");

        match self.gateway.get(path, &Map::new()).await {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => Err(format!("Lookup at {} did not return a list", path)),
            Err(e) => Err(format!("Failed to fetch {} for name lookup: {}", path, e)),
        }
    }

    pub async fn execute(&self, raw_args: Value) -> HandlerResult<BatchResponse> {
        let items = batch_items(&raw_args)?;

        let pool = if items.iter().any(|item| self.needs_lookup(item)) {
            Some(self.fetch_pool().await)
        } else {
            None
        };

        let outcomes = join_all(
            items
                .iter()
                .map(|item| self.process_item(item, pool.as_ref())),
        )
        .await;

        let response = BatchResponse::from_outcomes(outcomes);
        info!(
            tool = %self.config.name,
            total = response.summary.total,
            failed = response.summary.failed,
            "batch completed"
        );
        Ok(response)
    }

    async fn process_item(
        &self,
        raw: &Value,
        pool: Option<&Result<Vec<Value>, String>>,
    ) -> ItemOutcome {
        match self.try_item(raw, pool).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(tool = %self.config.name, error = %e, "batch item failed");
                ItemOutcome::failed(e.to_string(), raw)
            }
        }
    }

    async fn try_item(
        &self,
        raw: &Value,
        pool: Option<&Result<Vec<Value>, String>>,
    ) -> HandlerResult<ItemOutcome> {
        let mut item = self
            .config
            .schema
            .validate(raw)
            .map_err(HandlerError::Validation)?;

        if let Some(validator) = &self.config.validator {
            validator
                .validate(&item)
                .map_err(|e| HandlerError::Validation(non_empty(e)))?;
        }

        let id_field = match (&self.config.id_field, self.config.mode) {
            (Some(id_field), mode) if mode != OpMode::Create => id_field,
            _ => {
                let path = self.config.path.create_path();
                let result =
                    call_rest(self.gateway.as_ref(), self.config.method, path, &item).await?;
                return Ok(ItemOutcome::Created {
                    created_item: result,
                });
            }
        };

        let mut id = item.get(id_field).and_then(id_string);
        let mut found_by_name = None;
        let mut matched_content = None;

        if id.is_none() {
            if let Some(lookup) = &self.config.lookup {
                let term = item
                    .get(&lookup.field)
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty());
                if let Some(term) = term {
                    let candidates: &[Value] = match pool {
                        Some(Ok(candidates)) => candidates.as_slice(),
                        Some(Err(e)) => return Err(HandlerError::Resolution(e.clone())),
                        None => &[],
                    };
                    let matched = find_by_name(term, candidates, lookup.matcher.as_ref())
                        .ok_or_else(|| {
                            HandlerError::Resolution(format!("Item not found with name: {}", term))
                        })?;

                    id = matched.get("id").and_then(id_string);
                    found_by_name = Some(term.to_string());
                    matched_content = matched.get(lookup.matcher.display_field()).cloned();
                }
            }
        }

        let id = id.ok_or_else(|| HandlerError::Resolution(self.missing_target_message(id_field)))?;
        check_path_value(id_field, &id)?;

        item.remove(id_field);
        if let Some(lookup) = &self.config.lookup {
            item.remove(&lookup.field);
        }

        let path = self.config.path.item_path(&id);
        let result = call_rest(self.gateway.as_ref(), self.config.method, &path, &item).await?;

        Ok(ItemOutcome::Resolved {
            id,
            result,
            found_by_name,
            matched_content,
        })
    }

    fn missing_target_message(&self, id_field: &str) -> String {
        match &self.config.lookup {
            Some(lookup) => format!("Either {} or {} must be provided", id_field, lookup.field),
            None => format!("{} must be provided", id_field),
        }
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

pub(crate) fn non_empty(message: String) -> String {
    if message.is_empty() {
        "Validation failed".to_string()
    } else {
        message
    }
}

#[async_trait]
impl ToolHandler for BatchHandler {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }

    fn full_description(&self) -> String {
        self.config.full_description()
    }

    fn input_schema(&self) -> Map<String, Value> {
        batch_input_schema(self.config.schema.json_schema())
    }

    async fn call(&self, args: Value) -> HandlerResult<ToolOutput> {
        let response = self.execute(args).await?;
        Ok(ToolOutput::Json(serde_json::to_value(response)?))
    }
}
