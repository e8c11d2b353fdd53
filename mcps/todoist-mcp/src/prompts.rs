//! MCP prompts
//!
//! `projects_list` renders every project with its sections as a markdown
//! overview, giving a model the IDs it needs for later tool calls.

use rmcp::model::{GetPromptResult, Prompt, PromptMessage, PromptMessageRole};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::gateway::{Gateway, GatewayResult};
use crate::resolve::id_string;

pub const PROJECTS_LIST: &str = "projects_list";

const DESCRIPTION_LIMIT: usize = 100;

/// Prompts advertised in `prompts/list`
pub fn prompts() -> Vec<Prompt> {
    vec![Prompt::new(PROJECTS_LIST, Some("List of projects"), None)]
}

/// Fetch projects and sections concurrently and render the overview
pub async fn projects_list(gateway: &dyn Gateway) -> GatewayResult<GetPromptResult> {
    let empty = Map::new();
    let (projects, sections) =
        tokio::try_join!(gateway.get("/projects", &empty), gateway.get("/sections", &empty))?;

    let text = render_projects_overview(as_list(&projects), as_list(&sections));
    Ok(GetPromptResult {
        description: Some("List of projects".to_string()),
        messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
    })
}

fn as_list(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

/// Markdown overview of projects and their sections, in remote order
pub fn render_projects_overview(projects: &[Value], sections: &[Value]) -> String {
    let mut by_project: HashMap<String, Vec<&Value>> = HashMap::new();
    for section in sections {
        if let Some(project_id) = section.get("project_id").and_then(id_string) {
            by_project.entry(project_id).or_default().push(section);
        }
    }

    let mut lines = vec![
        "# Todoist Projects Overview".to_string(),
        String::new(),
        format!("*Total Projects: {}*", projects.len()),
        String::new(),
    ];

    for project in projects {
        let id = project.get("id").and_then(id_string).unwrap_or_default();

        lines.push(format!("## {}", text_field(project, "name")));
        lines.push("| Property | Value |".to_string());
        lines.push("| -------- | ----- |".to_string());
        lines.push(format!("| ID | `{}` |", id));
        lines.push(format!("| Order | {} |", scalar(project.get("order"))));

        let parent = project
            .get("parent_id")
            .and_then(id_string)
            .unwrap_or_else(|| "None".to_string());
        lines.push(format!("| Parent ID | {} |", parent));
        lines.push(format!("| View Style | {} |", text_field(project, "view_style")));

        if flag(project, "is_inbox_project") {
            lines.push("| Status | Inbox Project |".to_string());
        }
        if flag(project, "is_shared") {
            lines.push("| Sharing | Shared |".to_string());
        }

        let description = text_field(project, "description");
        if !description.is_empty() {
            lines.push(format!(
                "| Description | {} |",
                truncate_words(description, DESCRIPTION_LIMIT)
            ));
        }

        lines.push(String::new());

        match by_project.get(&id) {
            Some(project_sections) if !project_sections.is_empty() => {
                lines.push(format!("### Sections ({})", project_sections.len()));
                for section in project_sections {
                    lines.push(format!(
                        "- **{}** (ID: `{}`)",
                        text_field(section, "name"),
                        section.get("id").and_then(id_string).unwrap_or_default()
                    ));
                }
            }
            _ => lines.push("### Sections\n*No sections found*".to_string()),
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

/// Cut to `limit` characters, dropping the trailing partial word
fn truncate_words(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let head: String = text.chars().take(limit).collect();
    let mut words: Vec<&str> = head.split(' ').collect();
    words.pop();
    format!("{}...", words.join(" "))
}

fn text_field<'a>(value: &'a Value, field: &str) -> &'a str {
    value.get(field).and_then(Value::as_str).unwrap_or_default()
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn flag(value: &Value, field: &str) -> bool {
    value.get(field).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::FakeGateway;
    use serde_json::json;

    #[test]
    fn test_render_overview() {
        let projects = vec![
            json!({
                "id": "1", "name": "Inbox", "order": 0, "parent_id": null,
                "view_style": "list", "is_inbox_project": true, "is_shared": false,
                "description": ""
            }),
            json!({
                "id": "2", "name": "Work", "order": 1, "parent_id": "1",
                "view_style": "board", "is_inbox_project": false, "is_shared": true,
                "description": "Office things"
            }),
        ];
        let sections = vec![
            json!({"id": "s1", "name": "Backlog", "project_id": "2"}),
            json!({"id": "s2", "name": "Doing", "project_id": "2"}),
        ];

        let text = render_projects_overview(&projects, &sections);
        let expected = "\
# Todoist Projects Overview

*Total Projects: 2*

## Inbox
| Property | Value |
| -------- | ----- |
| ID | `1` |
| Order | 0 |
| Parent ID | None |
| View Style | list |
| Status | Inbox Project |

### Sections
*No sections found*

## Work
| Property | Value |
| -------- | ----- |
| ID | `2` |
| Order | 1 |
| Parent ID | 1 |
| View Style | board |
| Sharing | Shared |
| Description | Office things |

### Sections (2)
- **Backlog** (ID: `s1`)
- **Doing** (ID: `s2`)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_truncate_on_word_boundary() {
        let text = "word ".repeat(30);
        let truncated = truncate_words(&text, 100);
        assert!(truncated.ends_with("word..."));
        assert!(truncated.chars().count() <= 103);
        assert_eq!(truncate_words("short", 100), "short");
    }

    #[test]
    fn test_numeric_ids_match_sections() {
        let projects = vec![json!({"id": 7, "name": "P"})];
        let sections = vec![json!({"id": 9, "name": "S", "project_id": 7})];
        let text = render_projects_overview(&projects, &sections);
        assert!(text.contains("### Sections (1)\n- **S** (ID: `9`)"));
    }

    #[tokio::test]
    async fn test_projects_list_fetches_both_collections() {
        let gateway = FakeGateway::new()
            .respond_get("/projects", json!([{"id": "1", "name": "Inbox"}]))
            .respond_get("/sections", json!([]));

        let result = projects_list(gateway.as_ref()).await.unwrap();
        assert_eq!(result.messages.len(), 1);
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_projects_list_propagates_failure() {
        let gateway = FakeGateway::new()
            .respond_get("/projects", json!([]))
            .fail_get("/sections", 503, "unavailable");

        let err = projects_list(gateway.as_ref()).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
