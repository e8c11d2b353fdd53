//! Name-to-identifier resolution
//!
//! Batch tools accept a human-readable name instead of an ID. The candidate
//! pool is fetched once per batch and searched with a [`NameMatcher`].

use serde_json::Value;

/// Decides whether a candidate resource matches a search term
pub trait NameMatcher: Send + Sync {
    fn matches(&self, term: &str, candidate: &Value) -> bool;

    /// Field reported back as `matched_content` on a successful lookup
    fn display_field(&self) -> &str;
}

/// Case-insensitive substring match on one text field
#[derive(Debug, Clone)]
pub struct ContainsIgnoreCase {
    field: &'static str,
}

impl ContainsIgnoreCase {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl NameMatcher for ContainsIgnoreCase {
    fn matches(&self, term: &str, candidate: &Value) -> bool {
        candidate
            .get(self.field)
            .and_then(Value::as_str)
            .is_some_and(|text| text.to_lowercase().contains(&term.to_lowercase()))
    }

    fn display_field(&self) -> &str {
        self.field
    }
}

/// Case-insensitive exact match on one text field
#[derive(Debug, Clone)]
pub struct ExactIgnoreCase {
    field: &'static str,
}

impl ExactIgnoreCase {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl NameMatcher for ExactIgnoreCase {
    fn matches(&self, term: &str, candidate: &Value) -> bool {
        candidate
            .get(self.field)
            .and_then(Value::as_str)
            .is_some_and(|text| text.to_lowercase() == term.to_lowercase())
    }

    fn display_field(&self) -> &str {
        self.field
    }
}

/// Return the first candidate in pool order that matches `term`
///
/// Several matches are not an error; the first one wins and a warning is
/// logged so ambiguous lookups are visible.
pub fn find_by_name<'a>(
    term: &str,
    pool: &'a [Value],
    matcher: &dyn NameMatcher,
) -> Option<&'a Value> {
    let mut matches = pool.iter().filter(|c| matcher.matches(term, c));
    let first = matches.next()?;

    let others = matches.count();
    if others > 0 {
        tracing::warn!(
            term,
            candidates = others + 1,
            "name lookup is ambiguous, using first match"
        );
    }

    Some(first)
}

/// Render an identifier value as a string
///
/// Todoist IDs are strings, but numeric IDs are accepted too. Empty strings
/// and non-scalar values count as "no identifier".
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool() -> Vec<Value> {
        vec![
            json!({"id": "1", "content": "Buy milk"}),
            json!({"id": "2", "content": "Buy MILK and eggs"}),
            json!({"id": "3", "content": "Call mom"}),
        ]
    }

    #[test]
    fn test_contains_is_case_insensitive_and_first_wins() {
        let pool = pool();
        let matcher = ContainsIgnoreCase::new("content");
        let found = find_by_name("milk", &pool, &matcher).unwrap();
        assert_eq!(found["id"], "1");
    }

    #[test]
    fn test_no_match() {
        let pool = pool();
        let matcher = ContainsIgnoreCase::new("content");
        assert!(find_by_name("dentist", &pool, &matcher).is_none());
    }

    #[test]
    fn test_exact_match_skips_substrings() {
        let pool = pool();
        let matcher = ExactIgnoreCase::new("content");
        let found = find_by_name("buy milk and eggs", &pool, &matcher).unwrap();
        assert_eq!(found["id"], "2");
        assert!(find_by_name("milk", &pool, &matcher).is_none());
    }

    #[test]
    fn test_missing_field_never_matches() {
        let pool = vec![json!({"id": "9", "name": "Work"})];
        let matcher = ContainsIgnoreCase::new("content");
        assert!(find_by_name("work", &pool, &matcher).is_none());
    }

    #[test]
    fn test_id_string() {
        assert_eq!(id_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(id_string(&json!(42)), Some("42".to_string()));
        assert_eq!(id_string(&json!("")), None);
        assert_eq!(id_string(&json!(null)), None);
        assert_eq!(id_string(&json!(["1"])), None);
    }
}
