//! Per-request list inputs: paging, record status, filters, search, sort.
//!
//! Everything here is untrusted until it has gone through the `checked_*`
//! methods on [`ListRequest`], which every paginator calls before touching its
//! backend.

pub mod filter;
pub mod validation;

pub use filter::{contains_pattern, escape_like, value_as_text, FilterPattern};
pub use validation::{is_valid_identifier, parse_int_safe, sanitize_string, validate_enum, validate_pagination};

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Column name → raw filter value. Ordered so generated SQL is deterministic.
pub type FilterMap = BTreeMap<String, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.page_size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: validation::DEFAULT_PAGE,
            page_size: validation::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than a case-insensitive `ASC` sorts descending.
    pub fn parse(raw: Option<&str>) -> Self {
        let upper = raw.map(str::to_ascii_uppercase).unwrap_or_default();
        match validate_enum(upper.as_str(), &["ASC", "DESC"], Some("DESC")) {
            Some("ASC") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Which backend(s) a request is served from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSource {
    Sql,
    Nosql,
    Fake,
    Both,
}

impl std::str::FromStr for DataSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sql" => Ok(DataSource::Sql),
            "nosql" => Ok(DataSource::Nosql),
            "fake" => Ok(DataSource::Fake),
            "both" => Ok(DataSource::Both),
            other => Err(AppError::InvalidArgument(format!("'{}' is not a valid data source", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        SortSpec {
            column: column.into(),
            direction,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchSpec {
    pub q: String,
    pub columns: Vec<String>,
}

/// Normalize the representations callers use for the visibility flag.
pub fn record_status_of(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => parse_record_status_str(s),
        _ => None,
    }
}

fn parse_record_status_str(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Query-string `recordStatus`: omitted means visible rows only; junk is rejected.
pub fn parse_record_status(raw: Option<&str>) -> Result<bool, AppError> {
    match raw {
        None => Ok(true),
        Some(s) => parse_record_status_str(s)
            .ok_or_else(|| AppError::InvalidArgument(format!("invalid recordStatus value '{}'", s))),
    }
}

/// Everything a paginator needs for one call.
#[derive(Clone, Debug)]
pub struct ListRequest {
    pub page: PageRequest,
    pub record_status: bool,
    pub filters: FilterMap,
    pub allowed_filters: Vec<String>,
    pub search: Option<SearchSpec>,
    pub sort: Option<SortSpec>,
    pub allowed_sort_columns: Vec<String>,
    /// Fixed ordering used when no sort is requested.
    pub default_sort: SortSpec,
}

impl Default for ListRequest {
    fn default() -> Self {
        ListRequest {
            page: PageRequest::default(),
            record_status: true,
            filters: FilterMap::new(),
            allowed_filters: Vec::new(),
            search: None,
            sort: None,
            allowed_sort_columns: Vec::new(),
            default_sort: SortSpec::new("updatedAt", SortDirection::Desc),
        }
    }
}

/// Search after validation: the term and the columns that survived the identifier check.
#[derive(Debug, PartialEq, Eq)]
pub struct CheckedSearch<'a> {
    pub q: &'a str,
    pub columns: Vec<&'a str>,
}

impl ListRequest {
    /// Every filter key must be allow-listed and a valid identifier.
    pub fn checked_filters(&self) -> Result<Vec<(&str, FilterPattern)>, AppError> {
        self.filters
            .iter()
            .map(|(k, v)| {
                if !self.allowed_filters.iter().any(|a| a == k) {
                    return Err(AppError::InvalidArgument(format!("Filter column '{}' is not allowed", k)));
                }
                if !is_valid_identifier(k) {
                    return Err(AppError::InvalidArgument(format!("Invalid filter column name '{}'", k)));
                }
                Ok((k.as_str(), FilterPattern::parse(v)))
            })
            .collect()
    }

    /// `None` when search is inactive (empty term or no columns).
    pub fn checked_search(&self) -> Result<Option<CheckedSearch<'_>>, AppError> {
        let Some(search) = &self.search else { return Ok(None) };
        if search.q.is_empty() || search.columns.is_empty() {
            return Ok(None);
        }
        let columns: Vec<&str> = search
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| {
                let ok = is_valid_identifier(c);
                if !ok {
                    tracing::warn!(column = %c, "dropping invalid search column");
                }
                ok
            })
            .collect();
        if columns.is_empty() {
            return Err(AppError::InvalidArgument("No valid search columns provided".into()));
        }
        Ok(Some(CheckedSearch { q: &search.q, columns }))
    }

    /// The requested sort when allowed, `None` when absent (caller falls back to `default_sort`).
    pub fn checked_sort(&self) -> Result<Option<&SortSpec>, AppError> {
        let Some(sort) = &self.sort else { return Ok(None) };
        let allowed = self.allowed_sort_columns.iter().any(|a| *a == sort.column);
        if !allowed || !is_valid_identifier(&sort.column) {
            return Err(AppError::InvalidArgument(format!(
                "Invalid sortColumn value '{}' or not allowed",
                sort.column
            )));
        }
        Ok(Some(sort))
    }

    /// Resolved ordering: requested sort or the fixed default.
    pub fn effective_sort(&self) -> Result<&SortSpec, AppError> {
        if let Some(sort) = self.checked_sort()? {
            return Ok(sort);
        }
        if !is_valid_identifier(&self.default_sort.column) {
            return Err(AppError::InvalidArgument(format!(
                "Invalid default order column '{}'",
                self.default_sort.column
            )));
        }
        Ok(&self.default_sort)
    }
}
