//! Declarative argument schemas
//!
//! Each tool declares its fields once as [`FieldSpec`]s. The resulting
//! [`ItemSchema`] validates incoming arguments, applies defaults, drops
//! undeclared keys, and renders the JSON schema advertised in `tools/list`.

use serde_json::{json, Map, Value};

/// Type of a declared field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Integer { min: Option<i64>, max: Option<i64> },
    Number,
    Boolean,
    StringList,
    StringEnum(&'static [&'static str]),
    Object,
}

/// A single named field of a tool schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            description,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::String, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Integer { min: None, max: None }, description)
    }

    pub fn integer_range(
        name: &'static str,
        description: &'static str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Self {
        Self::new(name, FieldKind::Integer { min, max }, description)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Number, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean, description)
    }

    pub fn string_list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::StringList, description)
    }

    pub fn string_enum(
        name: &'static str,
        description: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self::new(name, FieldKind::StringEnum(values), description)
    }

    pub fn object(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Object, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value used when the caller omits the field
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        let name = self.name;
        match &self.kind {
            FieldKind::String if value.is_string() => Ok(()),
            FieldKind::String => Err(format!("'{}' must be a string", name)),
            FieldKind::Number if value.is_number() => Ok(()),
            FieldKind::Number => Err(format!("'{}' must be a number", name)),
            FieldKind::Boolean if value.is_boolean() => Ok(()),
            FieldKind::Boolean => Err(format!("'{}' must be a boolean", name)),
            FieldKind::Object if value.is_object() => Ok(()),
            FieldKind::Object => Err(format!("'{}' must be an object", name)),
            FieldKind::StringList => match value.as_array() {
                Some(items) if items.iter().all(Value::is_string) => Ok(()),
                _ => Err(format!("'{}' must be an array of strings", name)),
            },
            FieldKind::StringEnum(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(()),
                _ => Err(format!(
                    "'{}' must be one of: {}",
                    name,
                    allowed.join(", ")
                )),
            },
            FieldKind::Integer { min, max } => {
                let n = as_integer(value).ok_or_else(|| format!("'{}' must be an integer", name))?;
                if let Some(min) = min.filter(|min| n < *min) {
                    return Err(format!("'{}' must be >= {}", name, min));
                }
                if let Some(max) = max.filter(|max| n > *max) {
                    return Err(format!("'{}' must be <= {}", name, max));
                }
                Ok(())
            }
        }
    }

    fn json_schema(&self) -> Value {
        let mut schema = match &self.kind {
            FieldKind::String => json!({ "type": "string" }),
            FieldKind::Number => json!({ "type": "number" }),
            FieldKind::Boolean => json!({ "type": "boolean" }),
            FieldKind::Object => json!({ "type": "object" }),
            FieldKind::StringList => json!({ "type": "array", "items": { "type": "string" } }),
            FieldKind::StringEnum(values) => json!({ "type": "string", "enum": values }),
            FieldKind::Integer { min, max } => {
                let mut schema = json!({ "type": "integer" });
                if let Some(min) = min {
                    schema["minimum"] = json!(min);
                }
                if let Some(max) = max {
                    schema["maximum"] = json!(max);
                }
                schema
            }
        };
        if !self.description.is_empty() {
            schema["description"] = json!(self.description);
        }
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// An ordered set of field declarations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemSchema {
    fields: Vec<FieldSpec>,
}

impl ItemSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Validate raw arguments and return the normalized object
    ///
    /// `null` and missing values are treated alike. Defaults are filled in,
    /// undeclared keys are dropped, and every violation is reported at once.
    pub fn validate(&self, input: &Value) -> Result<Map<String, Value>, String> {
        let empty = Map::new();
        let object = match input {
            Value::Object(object) => object,
            Value::Null => &empty,
            other => return Err(format!("expected an object, got {}", type_name(other))),
        };

        let mut normalized = Map::new();
        let mut problems = Vec::new();

        for field in &self.fields {
            match object.get(field.name).filter(|v| !v.is_null()) {
                Some(value) => match field.check(value) {
                    Ok(()) => {
                        normalized.insert(field.name.to_string(), value.clone());
                    }
                    Err(problem) => problems.push(problem),
                },
                None => {
                    if let Some(default) = &field.default {
                        normalized.insert(field.name.to_string(), default.clone());
                    } else if field.required {
                        problems.push(format!("'{}' is required", field.name));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(normalized)
        } else {
            Err(problems.join("; "))
        }
    }

    /// JSON schema object for this field set
    pub fn json_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_schema() -> ItemSchema {
        ItemSchema::new(vec![
            FieldSpec::string("content", "Task content").required(),
            FieldSpec::integer_range("priority", "Priority", Some(1), Some(4)),
            FieldSpec::string_list("labels", "Labels"),
            FieldSpec::string_enum("duration_unit", "Unit", &["minute", "day"]),
            FieldSpec::string("due_lang", "Language").with_default(json!("en")),
        ])
    }

    #[test]
    fn test_validate_applies_defaults_and_drops_unknown_keys() {
        let args = json!({"content": "Buy milk", "unknown": 1});
        let normalized = task_schema().validate(&args).unwrap();
        assert_eq!(normalized.get("content"), Some(&json!("Buy milk")));
        assert_eq!(normalized.get("due_lang"), Some(&json!("en")));
        assert!(!normalized.contains_key("unknown"));
    }

    #[test]
    fn test_validate_reports_all_problems() {
        let args = json!({"priority": 7, "labels": ["a", 1], "duration_unit": "week"});
        let err = task_schema().validate(&args).unwrap_err();
        assert!(err.contains("'content' is required"));
        assert!(err.contains("'priority' must be <= 4"));
        assert!(err.contains("'labels' must be an array of strings"));
        assert!(err.contains("'duration_unit' must be one of: minute, day"));
    }

    #[test]
    fn test_integer_accepts_whole_floats_only() {
        let schema = ItemSchema::new(vec![FieldSpec::integer("order", "")]);
        assert!(schema.validate(&json!({"order": 3.0})).is_ok());
        assert!(schema.validate(&json!({"order": 3.5})).is_err());
        assert!(schema.validate(&json!({"order": "3"})).is_err());
    }

    #[test]
    fn test_null_arguments_are_empty_object() {
        let schema = ItemSchema::new(vec![FieldSpec::string("project_id", "")]);
        assert!(schema.validate(&Value::Null).unwrap().is_empty());
        assert!(schema.validate(&json!([1])).is_err());
    }

    #[test]
    fn test_json_schema_rendering() {
        let schema = task_schema().json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["content"]));
        assert_eq!(schema["properties"]["priority"]["maximum"], 4);
        assert_eq!(schema["properties"]["due_lang"]["default"], "en");
        assert_eq!(schema["properties"]["labels"]["items"]["type"], "string");
    }

    #[test]
    fn test_empty_schema_has_no_required_list() {
        let schema = ItemSchema::empty().json_schema();
        assert!(!schema.contains_key("required"));
        assert_eq!(schema["properties"], json!({}));
    }
}
