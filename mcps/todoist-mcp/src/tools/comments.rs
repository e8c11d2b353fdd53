//! Comment tools
//!
//! A comment belongs to either a task or a project, never both.

use super::{exactly_one_of, Catalog};
use crate::error::BuildError;
use crate::handlers::{BatchOpConfig, HttpMethod, OpMode, OpPath, SingleOpConfig};
use crate::schema::{FieldSpec, ItemSchema};

const PARENTS: &[&str] = &["task_id", "project_id"];

pub(super) fn register(catalog: &mut Catalog<'_>) -> Result<(), BuildError> {
    catalog.single(
        SingleOpConfig::builder(
            "get_comments",
            "Get all comments of a task or a project from Todoist, either `project_id` or `task_id` must be provided",
            HttpMethod::Get,
            "/comments",
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("project_id", "ID of the project used to filter comments"),
            FieldSpec::string("task_id", "ID of the task used to filter comments"),
        ]))
        .build()?,
    )?;

    catalog.single(
        SingleOpConfig::builder(
            "get_comment",
            "Get a comment from Todoist by ID",
            HttpMethod::Get,
            "/comments/{id}",
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the comment to retrieve").required(),
        ]))
        .build()?,
    )?;

    catalog.batch(
        BatchOpConfig::builder(
            "create_comments",
            "Create one or more comments in Todoist, each on either a task (`task_id`) or a project (`project_id`)",
            HttpMethod::Post,
            OpPath::full("/comments"),
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("task_id", "Comment's task ID (for task comments)"),
            FieldSpec::string("project_id", "Comment's project ID (for project comments)"),
            FieldSpec::string("content", "Comment markdown-formatted text and hyperlinks")
                .required(),
        ]))
        .validator(exactly_one_of(PARENTS))
        .build()?,
    )?;

    catalog.batch(
        BatchOpConfig::builder(
            "update_comments",
            "Update one or more comments in Todoist",
            HttpMethod::Post,
            OpPath::full("/comments/{id}"),
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the comment to update").required(),
            FieldSpec::string("content", "New content, markdown-formatted text and hyperlinks")
                .required(),
        ]))
        .mode(OpMode::Update)
        .id_field("id")
        .build()?,
    )?;

    catalog.batch(
        BatchOpConfig::builder(
            "delete_comments",
            "Delete one or more comments in Todoist",
            HttpMethod::Delete,
            OpPath::full("/comments/{id}"),
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the comment to delete").required(),
        ]))
        .mode(OpMode::Delete)
        .id_field("id")
        .build()?,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::registry::ToolRegistry;
    use crate::tests::{FakeGateway, RecordedCall};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_create_comments_needs_one_parent() {
        let gateway = FakeGateway::new().respond_post("/comments", json!({"id": "c1"}));
        let mut registry = ToolRegistry::new();
        crate::tools::register_all(&mut registry, gateway.clone()).unwrap();

        let result = registry
            .dispatch(
                "create_comments",
                json!({"items": [
                    {"task_id": "t1", "content": "ok"},
                    {"content": "orphan"},
                    {"task_id": "t1", "project_id": "p1", "content": "both"}
                ]}),
            )
            .await
            .unwrap();

        let body: Value = result.content[0]
            .as_text()
            .and_then(|t| serde_json::from_str(&t.text).ok())
            .unwrap_or(Value::Null);
        assert_eq!(body["summary"], json!({"total": 3, "succeeded": 1, "failed": 2}));
        assert_eq!(body["results"][0]["created_item"], json!({"id": "c1"}));
        assert_eq!(
            gateway.calls(),
            vec![RecordedCall::Post {
                path: "/comments".into(),
                body: json!({"task_id": "t1", "content": "ok"})
                    .as_object()
                    .cloned()
                    .unwrap()
            }]
        );
    }
}
