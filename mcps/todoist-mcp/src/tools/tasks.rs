//! Task tools

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{command_args, exactly_one_of, Catalog};
use crate::error::{BuildError, HandlerError, HandlerResult};
use crate::gateway::Gateway;
use crate::handlers::{
    BatchOpConfig, HttpMethod, NameLookup, OpMode, OpPath, SingleOpConfig, SyncOpConfig,
    TruncateToLimit,
};
use crate::registry::{ToolHandler, ToolOutput};
use crate::resolve::ContainsIgnoreCase;
use crate::schema::{FieldSpec, ItemSchema};

const DEFAULT_LIMIT: usize = 50;
const MOVE_DESTINATIONS: &[&str] = &["project_id", "section_id", "parent_id"];

/// Fields shared by task creation and update
fn task_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string(
            "description",
            "A description for the task. This value may contain markdown-formatted text and hyperlinks",
        ),
        FieldSpec::string_list(
            "labels",
            "The task's labels (a list of names that may represent either personal or shared labels)",
        ),
        FieldSpec::integer_range(
            "priority",
            "Task priority from 1 (normal) to 4 (urgent)",
            Some(1),
            Some(4),
        ),
        FieldSpec::string(
            "due_string",
            "Human defined task due date (ex.: \"next Monday\", \"Tomorrow\"). Value is set using local (not UTC) time",
        ),
        FieldSpec::string(
            "due_date",
            "Specific date in YYYY-MM-DD format relative to user's timezone",
        ),
        FieldSpec::string("due_datetime", "Specific date and time in RFC3339 format in UTC"),
        FieldSpec::string(
            "due_lang",
            "2-letter code specifying language in case due_string is not written in English",
        ),
        FieldSpec::string("assignee_id", "The responsible user ID (only applies to shared tasks)"),
        FieldSpec::integer_range(
            "duration",
            "A positive (greater than zero) integer for the amount of duration_unit the task will take",
            Some(1),
            None,
        ),
        FieldSpec::string_enum(
            "duration_unit",
            "The unit of time that the duration field represents",
            &["minute", "day"],
        ),
    ]
}

fn id_or_name(action: &'static str) -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("id", action),
        FieldSpec::string(
            "task_name",
            "Name of the task to search for when the ID is not known (case-insensitive partial match)",
        ),
    ]
}

fn task_lookup() -> NameLookup {
    NameLookup::new("task_name", ContainsIgnoreCase::new("content"))
}

fn drop_limit(args: &Map<String, Value>) -> Map<String, Value> {
    args.iter()
        .filter(|(key, value)| key.as_str() != "limit" && !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

const FILTER_DESCRIPTION: &str = concat!(
    "Natural language english filter like \"today\", \"overdue\", ",
    "\"#Project & !assigned\", \"(today | overdue) & #Work\""
);

fn item_move_args(item: &Map<String, Value>, id: &str) -> Map<String, Value> {
    command_args(item, id, MOVE_DESTINATIONS)
}

pub(super) fn register(catalog: &mut Catalog<'_>) -> Result<(), BuildError> {
    catalog.single(
        SingleOpConfig::builder("get_tasks", "Get tasks from Todoist", HttpMethod::Get, "/tasks")
            .schema(ItemSchema::new(vec![
                FieldSpec::string("project_id", "Filter tasks by project ID"),
                FieldSpec::string("section_id", "Filter tasks by section ID"),
                FieldSpec::string("label", "Filter by label name"),
                FieldSpec::string("filter", FILTER_DESCRIPTION),
                FieldSpec::string(
                    "ids",
                    "A list of the task IDs to retrieve, this should be a comma separated list",
                ),
                FieldSpec::number(
                    "limit",
                    "Maximum number of tasks to return, applied by this server after fetching",
                )
                .with_default(DEFAULT_LIMIT.into()),
            ]))
            .transform(drop_limit)
            .process_result(TruncateToLimit {
                arg: "limit",
                default: DEFAULT_LIMIT,
            })
            .build()?,
    )?;

    catalog.single(
        SingleOpConfig::builder(
            "get_task",
            "Get a task from Todoist by ID",
            HttpMethod::Get,
            "/tasks/{id}",
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the task to retrieve").required(),
        ]))
        .build()?,
    )?;

    let mut create_fields = vec![
        FieldSpec::string(
            "content",
            "Task content. This value may contain markdown-formatted text and hyperlinks",
        )
        .required(),
        FieldSpec::string(
            "project_id",
            "Task project ID. If not set, task is put to user's Inbox",
        ),
        FieldSpec::string("section_id", "ID of section to put task into"),
        FieldSpec::string("parent_id", "Parent task ID"),
        FieldSpec::integer(
            "order",
            "Non-zero integer value used by clients to sort tasks under the same parent",
        ),
    ];
    create_fields.extend(task_fields());
    catalog.batch(
        BatchOpConfig::builder(
            "create_tasks",
            "Create one or more tasks in Todoist",
            HttpMethod::Post,
            OpPath::full("/tasks"),
        )
        .schema(ItemSchema::new(create_fields))
        .build()?,
    )?;

    let mut update_fields = id_or_name("ID of the task to update");
    update_fields.push(FieldSpec::string(
        "content",
        "New task content. This value may contain markdown-formatted text and hyperlinks",
    ));
    update_fields.extend(task_fields());
    catalog.batch(
        BatchOpConfig::builder(
            "update_tasks",
            "Update one or more tasks in Todoist",
            HttpMethod::Post,
            OpPath::full("/tasks/{id}"),
        )
        .schema(ItemSchema::new(update_fields))
        .mode(OpMode::Update)
        .id_field("id")
        .lookup(task_lookup())
        .build()?,
    )?;

    for (name, description, suffix, id_description) in [
        (
            "close_tasks",
            "Close one or more tasks in Todoist",
            "/{id}/close",
            "ID of the task to close",
        ),
        (
            "reopen_tasks",
            "Reopen one or more tasks in Todoist",
            "/{id}/reopen",
            "ID of the task to reopen",
        ),
    ] {
        catalog.batch(
            BatchOpConfig::builder(
                name,
                description,
                HttpMethod::Post,
                OpPath::split("/tasks", suffix),
            )
            .schema(ItemSchema::new(id_or_name(id_description)))
            .mode(OpMode::Update)
            .id_field("id")
            .lookup(task_lookup())
            .build()?,
        )?;
    }

    catalog.batch(
        BatchOpConfig::builder(
            "delete_tasks",
            "Delete one or more tasks in Todoist, be careful, this action is irreversible",
            HttpMethod::Delete,
            OpPath::full("/tasks/{id}"),
        )
        .schema(ItemSchema::new(id_or_name("ID of the task to delete")))
        .mode(OpMode::Delete)
        .id_field("id")
        .lookup(task_lookup())
        .build()?,
    )?;

    let mut move_fields = id_or_name("ID of the task to move");
    move_fields.extend([
        FieldSpec::string("project_id", "Destination project ID"),
        FieldSpec::string("section_id", "Destination section ID"),
        FieldSpec::string("parent_id", "Destination parent task ID"),
    ]);
    catalog.sync(
        SyncOpConfig::builder(
            "move_tasks",
            "Move one or more tasks to another project, section or parent task. Each item takes exactly one destination",
            "item_move",
            "id",
            item_move_args,
        )
        .schema(ItemSchema::new(move_fields))
        .lookup(task_lookup(), "/tasks")
        .validator(exactly_one_of(MOVE_DESTINATIONS))
        .build()?,
    )?;

    let gateway = catalog.gateway();
    catalog.custom(CompletedTasksHandler::new(gateway))?;

    Ok(())
}

/// Arguments of `get_completed_tasks`
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CompletedTasksParams {
    #[schemars(description = "Only return tasks completed in this project")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[schemars(description = "Only return tasks completed after this date (YYYY-MM-DDTHH:MM)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,

    #[schemars(description = "Only return tasks completed before this date (YYYY-MM-DDTHH:MM)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,

    #[schemars(description = "Maximum number of tasks to return (default 30, max 200)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[schemars(description = "Number of tasks to skip, for paging")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    #[schemars(description = "Include the notes of each completed task")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotate_notes: Option<bool>,
}

/// Queries the completed-items surface, which only accepts form posts
struct CompletedTasksHandler {
    gateway: Arc<dyn Gateway>,
}

impl CompletedTasksHandler {
    fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ToolHandler for CompletedTasksHandler {
    fn name(&self) -> &str {
        "get_completed_tasks"
    }

    fn description(&self) -> &str {
        "Get completed tasks from Todoist, newest first"
    }

    fn input_schema(&self) -> Map<String, Value> {
        let schema = schemars::schema_for!(CompletedTasksParams);
        match serde_json::to_value(schema) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    async fn call(&self, args: Value) -> HandlerResult<ToolOutput> {
        let params: CompletedTasksParams =
            serde_json::from_value(args).map_err(|e| HandlerError::Validation(e.to_string()))?;

        let params = match serde_json::to_value(&params)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let result = self.gateway.completed(&params).await?;
        Ok(ToolOutput::Json(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolRegistry;
    use crate::tests::{FakeGateway, RecordedCall};
    use serde_json::json;

    fn registry(gateway: Arc<FakeGateway>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        crate::tools::register_all(&mut registry, gateway).unwrap();
        registry
    }

    fn text(result: &mcp_common::CallToolResult) -> Value {
        let text = result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .unwrap_or_default();
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    }

    #[tokio::test]
    async fn test_get_tasks_limit_is_not_forwarded() {
        let remote: Vec<Value> = (1..=5).map(|i| json!({"id": i.to_string()})).collect();
        let gateway = FakeGateway::new().respond_get("/tasks", Value::Array(remote));
        let registry = registry(gateway.clone());

        let result = registry
            .dispatch("get_tasks", json!({"project_id": "p1", "limit": 2}))
            .await
            .unwrap();

        assert_eq!(text(&result), json!([{"id": "1"}, {"id": "2"}]));
        let expected = json!({"project_id": "p1"}).as_object().cloned().unwrap();
        assert_eq!(
            gateway.calls(),
            vec![RecordedCall::Get {
                path: "/tasks".into(),
                query: expected
            }]
        );
    }

    #[tokio::test]
    async fn test_get_tasks_zero_limit_uses_default() {
        let remote: Vec<Value> = (0..60).map(|i| json!({"id": i.to_string()})).collect();
        let gateway = FakeGateway::new().respond_get("/tasks", Value::Array(remote));
        let registry = registry(gateway);

        let result = registry.dispatch("get_tasks", json!({"limit": 0})).await.unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(text(&result).as_array().map(Vec::len), Some(50));
    }

    #[tokio::test]
    async fn test_get_tasks_defaults_to_fifty() {
        let remote: Vec<Value> = (0..60).map(|i| json!({"id": i.to_string()})).collect();
        let gateway = FakeGateway::new().respond_get("/tasks", Value::Array(remote));
        let registry = registry(gateway);

        let result = registry.dispatch("get_tasks", json!({})).await.unwrap();
        assert_eq!(text(&result).as_array().map(Vec::len), Some(50));
    }

    #[tokio::test]
    async fn test_close_tasks_by_name() {
        let gateway = FakeGateway::new()
            .respond_get(
                "/tasks",
                json!([
                    {"id": "1", "content": "Buy milk"},
                    {"id": "2", "content": "Write report"}
                ]),
            )
            .respond_post("/tasks/2/close", Value::Null);
        let registry = registry(gateway.clone());

        let result = registry
            .dispatch("close_tasks", json!({"items": [{"task_name": "REPORT"}]}))
            .await
            .unwrap();

        let body = text(&result);
        assert_eq!(body["success"], true);
        assert_eq!(body["results"][0]["id"], "2");
        assert_eq!(body["results"][0]["found_by_name"], "REPORT");
        assert_eq!(body["results"][0]["matched_content"], "Write report");
        assert_eq!(body["results"][0]["result"], Value::Null);
    }

    #[tokio::test]
    async fn test_move_tasks_requires_one_destination() {
        let gateway = FakeGateway::new();
        let registry = registry(gateway.clone());

        let result = registry
            .dispatch(
                "move_tasks",
                json!({"items": [{"id": "1", "project_id": "p", "section_id": "s"}]}),
            )
            .await
            .unwrap();

        let body = text(&result);
        assert_eq!(body["success"], false);
        assert_eq!(body["summary"]["failed"], 1);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_move_tasks_builds_item_move() {
        let gateway = FakeGateway::new().respond_sync(json!({"sync_status": {}}));
        let registry = registry(gateway.clone());

        registry
            .dispatch("move_tasks", json!({"items": [{"id": "7", "section_id": "s1"}]}))
            .await
            .unwrap();

        match gateway.calls().as_slice() {
            [RecordedCall::Sync { commands }] => {
                assert_eq!(commands.len(), 1);
                assert_eq!(commands[0].command_type, "item_move");
                assert_eq!(
                    Value::Object(commands[0].args.clone()),
                    json!({"id": "7", "section_id": "s1"})
                );
            }
            other => panic!("unexpected calls: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_completed_tasks_sends_only_given_params() {
        let gateway = FakeGateway::new().respond_completed(json!({"items": []}));
        let registry = registry(gateway.clone());

        registry
            .dispatch("get_completed_tasks", json!({"project_id": "p1", "limit": 10}))
            .await
            .unwrap();

        let expected = json!({"project_id": "p1", "limit": 10})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(
            gateway.calls(),
            vec![RecordedCall::Completed { params: expected }]
        );
    }

    #[tokio::test]
    async fn test_completed_tasks_rejects_unknown_fields() {
        let gateway = FakeGateway::new();
        let registry = registry(gateway.clone());

        let result = registry
            .dispatch("get_completed_tasks", json!({"projet_id": "p1"}))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_completed_schema_lists_fields() {
        let handler = CompletedTasksHandler::new(FakeGateway::new());
        let schema = handler.input_schema();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("since"));
        assert!(properties.contains_key("annotate_notes"));
    }
}
