//! Raw entity config types matching the entities JSON file.

use serde::{Deserialize, Serialize};

/// Columns every entity table carries, with their config type names.
pub const BASE_COLUMNS: &[(&str, &str)] = &[
    ("id", "uuid"),
    ("recordStatus", "boolean"),
    ("createdAt", "timestamptz"),
    ("updatedAt", "timestamptz"),
    ("updatedBy", "text"),
    ("useAs", "text"),
    ("slug", "text"),
];

/// Type names accepted in `columns[].type`.
pub const COLUMN_TYPES: &[&str] = &["text", "integer", "double", "boolean", "timestamptz", "uuid", "jsonb"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type", default = "default_column_type")]
    pub type_: String,
}

fn default_column_type() -> String {
    "text".into()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefaultSortConfig {
    pub column: String,
    /// `ASC` or `DESC`; anything else sorts descending.
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub path_segment: String,
    pub table: String,
    /// Fixture collection name; defaults to `path_segment`.
    #[serde(default)]
    pub collection: Option<String>,
    /// Columns beyond [`BASE_COLUMNS`].
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub search_columns: Vec<String>,
    #[serde(default)]
    pub sort_columns: Vec<String>,
    #[serde(default)]
    pub default_sort: Option<DefaultSortConfig>,
    /// Column names that must never be exposed in API responses (e.g. password hashes, secrets).
    #[serde(default)]
    pub sensitive_columns: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitiesFile {
    pub entities: Vec<EntityConfig>,
}
