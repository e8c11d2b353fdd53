//! Static helpers that need no remote call

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::Catalog;
use crate::error::{BuildError, HandlerResult};
use crate::registry::{ToolHandler, ToolOutput};

/// A named Todoist color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub id: u32,
    pub name: &'static str,
    pub hex: &'static str,
}

/// Colors accepted by projects, labels and filters
pub const COLORS: &[Color] = &[
    Color { id: 30, name: "berry_red", hex: "#B8255F" },
    Color { id: 31, name: "red", hex: "#DC4C3E" },
    Color { id: 32, name: "orange", hex: "#C77100" },
    Color { id: 33, name: "yellow", hex: "#B29104" },
    Color { id: 34, name: "olive_green", hex: "#949C31" },
    Color { id: 35, name: "lime_green", hex: "#65A33A" },
    Color { id: 36, name: "green", hex: "#369307" },
    Color { id: 37, name: "mint_green", hex: "#42A393" },
    Color { id: 38, name: "teal", hex: "#148FAD" },
    Color { id: 39, name: "sky_blue", hex: "#319DC0" },
];

fn palette_text() -> String {
    COLORS
        .iter()
        .map(|c| format!("ID: {}, {}, ({})", c.id, c.name, c.hex))
        .collect::<Vec<_>>()
        .join(". ")
}

struct ColorsHandler;

#[async_trait]
impl ToolHandler for ColorsHandler {
    fn name(&self) -> &str {
        "utils_get_colors"
    }

    fn description(&self) -> &str {
        "Get available colors for projects, labels, filters in Todoist"
    }

    fn input_schema(&self) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema
    }

    async fn call(&self, _args: Value) -> HandlerResult<ToolOutput> {
        Ok(ToolOutput::Text(palette_text()))
    }
}

pub(super) fn register(catalog: &mut Catalog<'_>) -> Result<(), BuildError> {
    catalog.custom(ColorsHandler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_text() {
        let text = palette_text();
        assert!(text.starts_with("ID: 30, berry_red, (#B8255F). ID: 31, red, (#DC4C3E)"));
        assert!(text.ends_with("ID: 39, sky_blue, (#319DC0)"));
        assert_eq!(text.matches("ID: ").count(), COLORS.len());
    }

    #[tokio::test]
    async fn test_handler_returns_text() {
        let output = ColorsHandler.call(Value::Null).await.unwrap();
        assert!(matches!(output, ToolOutput::Text(ref t) if t.contains("teal")));
    }
}
