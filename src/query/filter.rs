//! Filter predicate shared by every backend: exact match or wildcard "contains".
//!
//! The SQL builder turns a [`FilterPattern`] into a bound clause; the in-memory
//! paginators evaluate the same pattern with [`FilterPattern::matches`].

use serde_json::Value;

/// Characters that turn a filter value into a "contains" match.
const WILDCARDS: [char; 2] = ['*', '%'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterPattern {
    /// Case-insensitive equality against the stringified field.
    Exact(String),
    /// Case-insensitive substring; wildcard characters already removed.
    Contains(String),
}

impl FilterPattern {
    pub fn parse(raw: &str) -> Self {
        if raw.contains(WILDCARDS) {
            FilterPattern::Contains(raw.replace(WILDCARDS, ""))
        } else {
            FilterPattern::Exact(raw.to_string())
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            FilterPattern::Exact(v) => candidate.to_lowercase() == v.to_lowercase(),
            FilterPattern::Contains(needle) => candidate.to_lowercase().contains(&needle.to_lowercase()),
        }
    }

    /// Evaluate against a document field; a missing field behaves as an empty string.
    pub fn matches_field(&self, field: Option<&Value>) -> bool {
        self.matches(&field.map(value_as_text).unwrap_or_default())
    }
}

/// Stringify a JSON scalar the way a query-string comparison sees it.
pub fn value_as_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => v.to_string(),
    }
}

/// Escape LIKE metacharacters so user text only ever matches literally.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%term%` with the term escaped.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}
