//! Resolved entity model: config validated and flattened for runtime use.

use crate::error::AppError;
use crate::query::{
    parse_record_status, sanitize_string, validate_pagination, DataSource, FilterMap, ListRequest, SearchSpec,
    SortDirection, SortSpec,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Query parameters with a meaning of their own; everything else is a filter.
pub const CONTROL_PARAMS: &[&str] = &["dataSource", "page", "pageSize", "q", "sortBy", "sortDir", "recordStatus"];

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    /// Config type name (`text`, `integer`, ...).
    pub type_name: String,
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub path_segment: String,
    pub table: String,
    pub collection: String,
    /// Base columns first, then the declared ones.
    pub columns: Vec<ColumnInfo>,
    pub filters: Vec<String>,
    pub search_columns: Vec<String>,
    pub sort_columns: Vec<String>,
    pub default_sort: SortSpec,
    /// Column names to strip from all API responses (sensitive data).
    pub sensitive_columns: HashSet<String>,
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// `dataSource` is mandatory on every entity route.
pub fn data_source_param(params: &HashMap<String, String>) -> Result<DataSource, AppError> {
    non_empty(params, "dataSource")
        .ok_or_else(|| AppError::InvalidArgument("dataSource is required".into()))?
        .parse()
}

impl ResolvedEntity {
    /// Build a list request from raw query parameters. Filter keys are checked later by the paginator.
    pub fn list_request(&self, params: &HashMap<String, String>) -> Result<ListRequest, AppError> {
        let page = validate_pagination(non_empty(params, "page"), non_empty(params, "pageSize"));
        let record_status = parse_record_status(non_empty(params, "recordStatus"))?;

        let search = non_empty(params, "q")
            .map(sanitize_string)
            .filter(|q| !q.is_empty())
            .map(|q| SearchSpec {
                q,
                columns: self.search_columns.clone(),
            });

        let sort = non_empty(params, "sortBy")
            .map(|column| SortSpec::new(column, SortDirection::parse(params.get("sortDir").map(String::as_str))));

        let filters: FilterMap = params
            .iter()
            .filter(|(k, v)| !CONTROL_PARAMS.contains(&k.as_str()) && !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(ListRequest {
            page,
            record_status,
            filters,
            allowed_filters: self.filters.clone(),
            search,
            sort,
            allowed_sort_columns: self.sort_columns.clone(),
            default_sort: self.default_sort.clone(),
        })
    }

    /// Remove sensitive keys from a row in place.
    pub fn strip_sensitive(&self, row: &mut Value) {
        if let Value::Object(map) = row {
            for col in &self.sensitive_columns {
                map.remove(col);
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    pub entities: Vec<ResolvedEntity>,
    pub entity_by_path: HashMap<String, ResolvedEntity>,
}

impl EntityRegistry {
    pub fn entity_by_path(&self, path: &str) -> Option<&ResolvedEntity> {
        self.entity_by_path.get(path)
    }
}
