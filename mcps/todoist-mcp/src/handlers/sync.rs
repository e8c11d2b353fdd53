//! Sync-command batch handler constructor
//!
//! Used where Todoist only offers an operation through the Sync API command
//! queue (moves). Each valid item becomes one [`SyncCommand`]; all commands
//! of a call go out in a single `sync` request.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::batch::non_empty;
use super::outcome::{BatchResponse, ItemOutcome};
use super::{batch_input_schema, batch_items, CommandArgsBuilder, ItemValidator, NameLookup};
use crate::error::{BuildError, HandlerError, HandlerResult};
use crate::gateway::{Gateway, SyncCommand};
use crate::registry::{ToolHandler, ToolOutput};
use crate::resolve::{find_by_name, id_string};
use crate::schema::ItemSchema;

/// Name lookup for sync tools, with the collection to search
#[derive(Clone, Debug)]
pub struct SyncLookup {
    pub lookup: NameLookup,
    /// REST path listing the candidates, e.g. `/tasks`
    pub path: String,
}

/// Static description of a sync-batch tool
#[derive(Clone)]
pub struct SyncOpConfig {
    pub name: String,
    pub description: String,
    pub schema: ItemSchema,
    pub command_type: String,
    pub id_field: String,
    pub lookup: Option<SyncLookup>,
    pub args_builder: Arc<dyn CommandArgsBuilder>,
    pub validator: Option<Arc<dyn ItemValidator>>,
}

impl SyncOpConfig {
    pub fn builder(
        name: impl Into<String>,
        description: impl Into<String>,
        command_type: impl Into<String>,
        id_field: impl Into<String>,
        args_builder: impl CommandArgsBuilder + 'static,
    ) -> SyncOpConfigBuilder {
        SyncOpConfigBuilder {
            config: SyncOpConfig {
                name: name.into(),
                description: description.into(),
                schema: ItemSchema::empty(),
                command_type: command_type.into(),
                id_field: id_field.into(),
                lookup: None,
                args_builder: Arc::new(args_builder),
                validator: None,
            },
        }
    }

    pub fn full_description(&self) -> String {
        match &self.lookup {
            Some(lookup) => format!(
                "{}\nEither '{}' or the '{}' to identify the target.",
                self.description, self.id_field, lookup.lookup.field
            ),
            None => self.description.clone(),
        }
    }
}

pub struct SyncOpConfigBuilder {
    config: SyncOpConfig,
}

impl SyncOpConfigBuilder {
    pub fn schema(mut self, schema: ItemSchema) -> Self {
        self.config.schema = schema;
        self
    }

    /// Enable name lookup against the collection at `path`
    pub fn lookup(mut self, lookup: NameLookup, path: impl Into<String>) -> Self {
        self.config.lookup = Some(SyncLookup {
            lookup,
            path: path.into(),
        });
        self
    }

    pub fn validator(mut self, validator: impl ItemValidator + 'static) -> Self {
        self.config.validator = Some(Arc::new(validator));
        self
    }

    pub fn build(self) -> Result<SyncOpConfig, BuildError> {
        let config = self.config;

        let referenced = std::iter::once(&config.id_field)
            .chain(config.lookup.as_ref().map(|l| &l.lookup.field));
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

/// Where an item stands after validation and resolution
enum Prepared {
    Failed(ItemOutcome),
    Queued {
        id: String,
        command: usize,
        found_by_name: Option<String>,
    },
}

/// Tool handler folding a batch into one Sync API request
pub struct SyncBatchHandler {
    config: SyncOpConfig,
    gateway: Arc<dyn Gateway>,
}

impl SyncBatchHandler {
    pub fn new(config: SyncOpConfig, gateway: Arc<dyn Gateway>) -> Self {
        Self { config, gateway }
    }

    fn needs_lookup(&self, item: &Value) -> bool {
        let Some(lookup) = &self.config.lookup else {
            return false;
        };
        item.get(&self.config.id_field).and_then(id_string).is_none()
            && item
                .get(&lookup.lookup.field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
    }

    async fn fetch_pool(&self, path: &str) -> Result<Vec<Value>, String> {
        debug!(tool = %self.config.name, %path, "fetching candidates for name lookup");

        match self.gateway.get(path, &Map::new()).await {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => Err(format!("Lookup at {} did not return a list", path)),
            Err(e) => Err(format!("Failed to fetch {} for name lookup: {}", path, e)),
        }
    }

    pub async fn execute(&self, raw_args: Value) -> HandlerResult<BatchResponse> {
        let items = batch_items(&raw_args)?;

        let pool = match &self.config.lookup {
            Some(lookup) if items.iter().any(|item| self.needs_lookup(item)) => {
                Some(self.fetch_pool(&lookup.path).await)
            }
            _ => None,
        };

        let mut commands = Vec::new();
        let prepared: Vec<Prepared> = items
            .iter()
            .map(|raw| match self.prepare(raw, pool.as_ref()) {
                Ok((id, command, found_by_name)) => {
                    commands.push(command);
                    Prepared::Queued {
                        id,
                        command: commands.len() - 1,
                        found_by_name,
                    }
                }
                Err(e) => {
                    warn!(tool = %self.config.name, error = %e, "sync item rejected");
                    Prepared::Failed(ItemOutcome::failed(e.to_string(), raw))
                }
            })
            .collect();

        if commands.is_empty() {
            info!(tool = %self.config.name, "no valid items, skipping sync request");
            return Ok(BatchResponse::from_outcomes(
                prepared.into_iter().filter_map(failed_outcome).collect(),
            ));
        }

        debug!(tool = %self.config.name, count = commands.len(), "submitting sync commands");
        let sync_result = self.gateway.sync(&commands).await;

        let outcomes = prepared
            .into_iter()
            .zip(items.iter())
            .map(|(prepared, raw)| match prepared {
                Prepared::Failed(outcome) => outcome,
                Prepared::Queued {
                    id,
                    command,
                    found_by_name,
                } => match &sync_result {
                    Ok(_) => ItemOutcome::Queued {
                        id,
                        command: commands[command].clone(),
                        found_by_name,
                    },
                    Err(e) => ItemOutcome::failed(e.to_string(), raw),
                },
            })
            .collect();

        let response = BatchResponse::from_outcomes(outcomes)
            .with_sync_result(sync_result.unwrap_or(Value::Null));
        info!(
            tool = %self.config.name,
            total = response.summary.total,
            failed = response.summary.failed,
            "sync batch completed"
        );
        Ok(response)
    }

    /// Validate and resolve one item into a command
    fn prepare(
        &self,
        raw: &Value,
        pool: Option<&Result<Vec<Value>, String>>,
    ) -> HandlerResult<(String, SyncCommand, Option<String>)> {
        let item = self
            .config
            .schema
            .validate(raw)
            .map_err(HandlerError::Validation)?;

        if let Some(validator) = &self.config.validator {
            validator
                .validate(&item)
                .map_err(|e| HandlerError::Validation(non_empty(e)))?;
        }

        let id_field = &self.config.id_field;
        let mut id = item.get(id_field).and_then(id_string);
        let mut found_by_name = None;

        if id.is_none() {
            if let Some(lookup) = &self.config.lookup {
                let term = item
                    .get(&lookup.lookup.field)
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty());
                if let Some(term) = term {
                    let candidates: &[Value] = match pool {
                        Some(Ok(candidates)) => candidates.as_slice(),
                        Some(Err(e)) => return Err(HandlerError::Resolution(e.clone())),
                        None => &[],
                    };
                    let matched =
                        find_by_name(term, candidates, lookup.lookup.matcher.as_ref())
                            .ok_or_else(|| {
                                HandlerError::Resolution(format!(
                                    "Item not found with name: {}",
                                    term
                                ))
                            })?;
                    id = matched.get("id").and_then(id_string);
                    found_by_name = Some(term.to_string());
                }
            }
        }

        let id = id.ok_or_else(|| {
            HandlerError::Resolution(match &self.config.lookup {
                Some(lookup) => format!(
                    "Either {} or {} must be provided",
                    id_field, lookup.lookup.field
                ),
                None => format!("{} must be provided", id_field),
            })
        })?;

        let args = self.config.args_builder.build(&item, &id);
        Ok((
            id,
            SyncCommand::new(&self.config.command_type, args),
            found_by_name,
        ))
    }
}

fn failed_outcome(prepared: Prepared) -> Option<ItemOutcome> {
    match prepared {
        Prepared::Failed(outcome) => Some(outcome),
        Prepared::Queued { .. } => None,
    }
}

#[async_trait]
impl ToolHandler for SyncBatchHandler {
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
