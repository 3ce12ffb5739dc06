//! Builds the parameterized COUNT + SELECT pair behind relational pagination.
//!
//! Identifiers are checked against `^[a-zA-Z0-9_]+$` (and the caller's
//! allow-lists) before they are quoted into the statement; every value goes
//! through a named binding rendered as a PostgreSQL `$n` placeholder.

use crate::error::AppError;
use crate::query::{contains_pattern, is_valid_identifier, FilterPattern, ListRequest};
use serde_json::Value;
use std::collections::BTreeMap;

/// Quote identifier for PostgreSQL (callers validate before quoting).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn checked_identifier(kind: &str, name: &str) -> Result<String, AppError> {
    if is_valid_identifier(name) {
        Ok(quoted(name))
    } else {
        Err(AppError::InvalidArgument(format!("Invalid {} name '{}'", kind, name)))
    }
}

/// SELECT list: `*` when empty, otherwise each column validated and quoted.
fn select_column_list(columns: &[String]) -> Result<String, AppError> {
    if columns.is_empty() {
        return Ok("*".to_string());
    }
    columns
        .iter()
        .map(|c| checked_identifier("column", c))
        .collect::<Result<Vec<_>, _>>()
        .map(|cols| cols.join(", "))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// A named value bound into the WHERE clause (`recordStatus`, `f_<col>`, `q_search`).
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

#[derive(Default)]
struct Bindings {
    list: Vec<Binding>,
}

impl Bindings {
    /// Placeholder for `name`; a name bound twice keeps its first index.
    fn bind(&mut self, name: &str, value: Value) -> String {
        if let Some(i) = self.list.iter().position(|b| b.name == name) {
            return format!("${}", i + 1);
        }
        self.list.push(Binding {
            name: name.to_string(),
            value,
        });
        format!("${}", self.list.len())
    }
}

/// The two statements of one paginated read. Both share `where_clause` and `bindings` verbatim.
#[derive(Debug)]
pub struct ListQuery {
    table: String,
    columns: String,
    where_clause: String,
    order_clause: String,
    bindings: Vec<Binding>,
    limit: u32,
    offset: u64,
}

impl ListQuery {
    pub fn where_clause(&self) -> &str {
        &self.where_clause
    }

    pub fn order_clause(&self) -> &str {
        &self.order_clause
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Every named value the statements bind, including `limit` and `offset`.
    pub fn replacements(&self) -> BTreeMap<String, Value> {
        let mut map: BTreeMap<String, Value> = self
            .bindings
            .iter()
            .map(|b| (b.name.clone(), b.value.clone()))
            .collect();
        map.insert("limit".into(), Value::from(self.limit));
        map.insert("offset".into(), Value::from(self.offset));
        map
    }

    pub fn count_query(&self) -> QueryBuf {
        let mut q = QueryBuf::new();
        q.params = self.bindings.iter().map(|b| b.value.clone()).collect();
        q.sql = format!(
            "SELECT COUNT(*) AS total FROM {} WHERE {}",
            self.table, self.where_clause
        );
        q
    }

    pub fn select_query(&self) -> QueryBuf {
        let mut q = QueryBuf::new();
        q.params = self.bindings.iter().map(|b| b.value.clone()).collect();
        let limit_ph = q.push_param(Value::from(self.limit));
        let offset_ph = q.push_param(Value::from(self.offset));
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
            self.columns, self.table, self.where_clause, self.order_clause, limit_ph, offset_ph
        );
        q
    }
}

/// Validate the request and assemble the shared WHERE/ORDER BY. Fails before any I/O.
pub fn build_list_query(table: &str, columns: &[String], request: &ListRequest) -> Result<ListQuery, AppError> {
    if !is_valid_identifier(table) {
        return Err(AppError::InvalidArgument(format!("Invalid table name '{}'", table)));
    }
    let columns = select_column_list(columns)?;
    let filters = request.checked_filters()?;
    let search = request.checked_search()?;
    let sort = request.effective_sort()?;

    let mut bindings = Bindings::default();
    let mut where_parts = vec![format!(
        "{} = {}",
        quoted("recordStatus"),
        bindings.bind("recordStatus", Value::Bool(request.record_status))
    )];

    for (col, pattern) in filters {
        let placeholder = format!("f_{}", col);
        match pattern {
            FilterPattern::Contains(needle) => {
                let ph = bindings.bind(&placeholder, Value::String(contains_pattern(&needle)));
                where_parts.push(format!("{}::text ILIKE {}", quoted(col), ph));
            }
            FilterPattern::Exact(v) => {
                let ph = bindings.bind(&placeholder, Value::String(v));
                where_parts.push(format!("LOWER({}::text) = LOWER({})", quoted(col), ph));
            }
        }
    }

    if let Some(search) = search {
        let ph = bindings.bind("q_search", Value::String(contains_pattern(search.q)));
        let likes: Vec<String> = search
            .columns
            .iter()
            .map(|c| format!("{}::text ILIKE {}", quoted(c), ph))
            .collect();
        where_parts.push(format!("({})", likes.join(" OR ")));
    }

    Ok(ListQuery {
        table: quoted(table),
        columns,
        where_clause: where_parts.join(" AND "),
        order_clause: format!("{} {}", quoted(&sort.column), sort.direction.as_sql()),
        bindings: bindings.list,
        limit: request.page.page_size,
        offset: request.page.offset(),
    })
}

/// SELECT one row by `"id"`. The id is compared as text so uuid and text keys both work.
pub fn select_by_id(table: &str, columns: &[String], id: &str) -> Result<QueryBuf, AppError> {
    let table = checked_identifier("table", table)?;
    let cols = select_column_list(columns)?;
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!("SELECT {} FROM {} WHERE {}::text = ${}", cols, table, quoted("id"), n);
    Ok(q)
}
