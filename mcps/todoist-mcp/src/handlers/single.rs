//! Single-operation handler constructor
//!
//! One tool call maps to one REST request. Path placeholders are filled from
//! the arguments and checked before anything leaves the process.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::{call_rest, check_path_value, placeholders, HttpMethod, ParamTransform, ResultProcessor};
use crate::error::{BuildError, HandlerError, HandlerResult};
use crate::gateway::Gateway;
use crate::registry::{ToolHandler, ToolOutput};
use crate::resolve::id_string;
use crate::schema::ItemSchema;

/// Static description of a single-request tool
#[derive(Clone)]
pub struct SingleOpConfig {
    pub name: String,
    pub description: String,
    pub schema: ItemSchema,
    pub method: HttpMethod,
    pub path: String,
    pub transform: Option<Arc<dyn ParamTransform>>,
    pub processor: Option<Arc<dyn ResultProcessor>>,
}

impl SingleOpConfig {
    pub fn builder(
        name: impl Into<String>,
        description: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> SingleOpConfigBuilder {
        SingleOpConfigBuilder {
            config: SingleOpConfig {
                name: name.into(),
                description: description.into(),
                schema: ItemSchema::empty(),
                method,
                path: path.into(),
                transform: None,
                processor: None,
            },
        }
    }
}

pub struct SingleOpConfigBuilder {
    config: SingleOpConfig,
}

impl SingleOpConfigBuilder {
    pub fn schema(mut self, schema: ItemSchema) -> Self {
        self.config.schema = schema;
        self
    }

    pub fn transform(mut self, transform: impl ParamTransform + 'static) -> Self {
        self.config.transform = Some(Arc::new(transform));
        self
    }

    pub fn process_result(mut self, processor: impl ResultProcessor + 'static) -> Self {
        self.config.processor = Some(Arc::new(processor));
        self
    }

    /// Every path placeholder must be a declared field
    pub fn build(self) -> Result<SingleOpConfig, BuildError> {
        let config = self.config;
        if let Some(param) = placeholders(&config.path)
            .into_iter()
            .find(|p| !config.schema.has_field(p))
        {
            return Err(BuildError::UndeclaredPathParam {
                tool: config.name.clone(),
                param: param.to_string(),
            });
        }
        Ok(config)
    }
}

/// Tool handler issuing exactly one REST request per call
pub struct ApiHandler {
    config: SingleOpConfig,
    gateway: Arc<dyn Gateway>,
}

impl ApiHandler {
    pub fn new(config: SingleOpConfig, gateway: Arc<dyn Gateway>) -> Self {
        Self { config, gateway }
    }

    /// Substitute placeholders, returning the final path and the consumed keys
    fn resolve_path(&self, args: &Map<String, Value>) -> HandlerResult<(String, Vec<String>)> {
        let mut path = self.config.path.clone();
        let mut used = Vec::new();

        for param in placeholders(&self.config.path) {
            let value = args
                .get(param)
                .and_then(path_value)
                .ok_or_else(|| HandlerError::MissingPathParam(param.to_string()))?;
            check_path_value(param, &value)?;

            path = path.replacen(&format!("{{{}}}", param), &value, 1);
            used.push(param.to_string());
        }

        Ok((path, used))
    }

    pub async fn execute(&self, raw_args: Value) -> HandlerResult<Value> {
        let args = self
            .config
            .schema
            .validate(&raw_args)
            .map_err(HandlerError::Validation)?;

        let (path, used) = self.resolve_path(&args)?;

        let params = match &self.config.transform {
            Some(transform) => transform.transform(&args),
            None => args
                .iter()
                .filter(|(key, value)| !value.is_null() && !used.contains(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        };

        debug!(tool = %self.config.name, method = %self.config.method, %path, "dispatching");
        let result = call_rest(self.gateway.as_ref(), self.config.method, &path, &params).await?;

        Ok(match &self.config.processor {
            Some(processor) => processor.process(result, &args),
            None => result,
        })
    }
}

fn path_value(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        other => id_string(other),
    }
}

#[async_trait]
impl ToolHandler for ApiHandler {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }

    fn input_schema(&self) -> Map<String, Value> {
        self.config.schema.json_schema()
    }

    async fn call(&self, args: Value) -> HandlerResult<ToolOutput> {
        self.execute(args).await.map(ToolOutput::Json)
    }
}
