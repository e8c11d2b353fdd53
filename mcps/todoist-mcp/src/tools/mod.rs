//! Todoist tool catalog
//!
//! Every tool is declared here as a configuration for one of the generic
//! handler constructors in [`crate::handlers`]. Only the color palette and
//! the completed-items query need hand-written handlers.

mod comments;
mod labels;
mod projects;
mod sections;
mod tasks;
mod utils;

pub use tasks::CompletedTasksParams;
pub use utils::{Color, COLORS};

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::BuildError;
use crate::gateway::Gateway;
use crate::handlers::{
    ApiHandler, BatchHandler, BatchOpConfig, SingleOpConfig, SyncBatchHandler, SyncOpConfig,
};
use crate::registry::{ToolHandler, ToolRegistry};

/// Register the whole catalog against one gateway
pub fn register_all(
    registry: &mut ToolRegistry,
    gateway: Arc<dyn Gateway>,
) -> Result<(), BuildError> {
    let mut catalog = Catalog { registry, gateway };
    tasks::register(&mut catalog)?;
    projects::register(&mut catalog)?;
    sections::register(&mut catalog)?;
    labels::register(&mut catalog)?;
    comments::register(&mut catalog)?;
    utils::register(&mut catalog)?;
    Ok(())
}

/// Registration context shared by the resource modules
pub(crate) struct Catalog<'a> {
    registry: &'a mut ToolRegistry,
    gateway: Arc<dyn Gateway>,
}

impl Catalog<'_> {
    fn single(&mut self, config: SingleOpConfig) -> Result<(), BuildError> {
        let handler = ApiHandler::new(config, self.gateway.clone());
        self.registry.register(Arc::new(handler))
    }

    fn batch(&mut self, config: BatchOpConfig) -> Result<(), BuildError> {
        let handler = BatchHandler::new(config, self.gateway.clone());
        self.registry.register(Arc::new(handler))
    }

    fn sync(&mut self, config: SyncOpConfig) -> Result<(), BuildError> {
        let handler = SyncBatchHandler::new(config, self.gateway.clone());
        self.registry.register(Arc::new(handler))
    }

    fn gateway(&self) -> Arc<dyn Gateway> {
        self.gateway.clone()
    }

    fn custom(&mut self, handler: impl ToolHandler + 'static) -> Result<(), BuildError> {
        self.registry.register(Arc::new(handler))
    }
}

/// Validator accepting items that set exactly one of `fields`
pub(crate) fn exactly_one_of(
    fields: &'static [&'static str],
) -> impl Fn(&Map<String, Value>) -> Result<(), String> + Send + Sync {
    move |item: &Map<String, Value>| {
        let given: Vec<&str> = fields
            .iter()
            .copied()
            .filter(|field| item.get(*field).is_some_and(|v| !v.is_null()))
            .collect();

        match given.len() {
            1 => Ok(()),
            0 => Err(format!("Exactly one of {} must be provided", fields.join(", "))),
            _ => Err(format!(
                "Only one of {} may be provided, got {}",
                fields.join(", "),
                given.join(", ")
            )),
        }
    }
}

/// Copy the listed fields of `item` next to the resolved `id`
pub(crate) fn command_args(
    item: &Map<String, Value>,
    id: &str,
    fields: &[&str],
) -> Map<String, Value> {
    let mut args = Map::new();
    args.insert("id".into(), Value::String(id.to_string()));
    for field in fields {
        if let Some(value) = item.get(*field).filter(|v| !v.is_null()) {
            args.insert((*field).to_string(), value.clone());
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::FakeGateway;
    use serde_json::json;

    fn catalog() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry, FakeGateway::new()).unwrap();
        registry
    }

    #[test]
    fn test_catalog_registers_every_resource() {
        let registry = catalog();
        for name in [
            "get_tasks",
            "get_task",
            "create_tasks",
            "update_tasks",
            "close_tasks",
            "reopen_tasks",
            "delete_tasks",
            "move_tasks",
            "get_completed_tasks",
            "get_projects",
            "get_project",
            "create_projects",
            "update_projects",
            "delete_projects",
            "move_projects",
            "get_collaborators",
            "get_sections",
            "get_section",
            "create_sections",
            "update_sections",
            "delete_sections",
            "move_sections",
            "get_labels",
            "get_label",
            "create_labels",
            "update_labels",
            "delete_labels",
            "get_shared_labels",
            "rename_shared_labels",
            "remove_shared_labels",
            "get_comments",
            "get_comment",
            "create_comments",
            "update_comments",
            "delete_comments",
            "utils_get_colors",
        ] {
            assert!(registry.contains(name), "{} is missing", name);
        }
        assert_eq!(registry.len(), 36);
    }

    #[test]
    fn test_every_schema_is_an_object() {
        for tool in catalog().tools() {
            assert_eq!(
                tool.input_schema.get("type"),
                Some(&json!("object")),
                "{}",
                tool.name
            );
        }
    }

    #[test]
    fn test_lookup_rule_is_advertised() {
        let tools = catalog().tools();
        let update = tools.iter().find(|t| t.name == "update_tasks").unwrap();
        let description = update.description.as_deref().unwrap_or_default();
        assert!(description.contains("Either 'id' or the 'task_name'"));
    }

    #[test]
    fn test_exactly_one_of() {
        let check = exactly_one_of(&["project_id", "section_id", "parent_id"]);
        let item = |v: Value| v.as_object().cloned().unwrap();

        assert!(check(&item(json!({"project_id": "p"}))).is_ok());
        assert_eq!(
            check(&item(json!({"id": "1"}))).unwrap_err(),
            "Exactly one of project_id, section_id, parent_id must be provided"
        );
        assert_eq!(
            check(&item(json!({"project_id": "p", "parent_id": "t"}))).unwrap_err(),
            "Only one of project_id, section_id, parent_id may be provided, got project_id, parent_id"
        );
        assert!(check(&item(json!({"section_id": "s", "parent_id": null}))).is_ok());
    }

    #[test]
    fn test_command_args_keeps_listed_fields() {
        let item = json!({"project_id": "p1", "content": "x", "section_id": null});
        let args = command_args(item.as_object().unwrap(), "42", &["project_id", "section_id"]);
        assert_eq!(Value::Object(args), json!({"id": "42", "project_id": "p1"}));
    }
}
