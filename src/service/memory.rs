//! In-process filtering, search, sort and paging over JSON documents.

use crate::error::AppError;
use crate::pagination::{paginate, PaginatedResult};
use crate::query::{record_status_of, value_as_text, ListRequest, SortDirection, SortSpec};
use crate::service::Paginator;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// Paginates a sequence it already holds.
pub struct InMemoryPaginator {
    items: Arc<Vec<Value>>,
}

impl InMemoryPaginator {
    pub fn new(items: Arc<Vec<Value>>) -> Self {
        InMemoryPaginator { items }
    }
}

#[async_trait]
impl Paginator for InMemoryPaginator {
    async fn paginate(&self, request: &ListRequest) -> Result<PaginatedResult<Value>, AppError> {
        list_documents(&self.items, request)
    }
}

/// Items without a `recordStatus` field are always visible.
fn visible(item: &Value, wanted: bool) -> bool {
    match item.get("recordStatus") {
        None => true,
        Some(v) => record_status_of(v) == Some(wanted),
    }
}

/// Type rank first, so mixed columns still sort under a total order.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) | Value::Object(_) => 4,
    }
}

/// Missing fields sort before present ones.
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a, b),
    };
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| value_as_text(a).cmp(&value_as_text(b))),
    }
}

fn sort_documents(items: &mut [&Value], sort: &SortSpec) {
    items.sort_by(|a, b| {
        let ord = compare_field(a.get(&sort.column), b.get(&sort.column));
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Validate like the SQL path, then filter (AND), search (OR), sort and slice.
/// Without a requested sort the default ordering applies, as it does in SQL.
pub fn list_documents(items: &[Value], request: &ListRequest) -> Result<PaginatedResult<Value>, AppError> {
    let filters = request.checked_filters()?;
    let search = request.checked_search()?;
    let sort = request.effective_sort()?;
    let needle = search.as_ref().map(|s| s.q.to_lowercase());

    let mut matched: Vec<&Value> = items
        .iter()
        .filter(|item| visible(item, request.record_status))
        .filter(|item| filters.iter().all(|(col, pattern)| pattern.matches_field(item.get(*col))))
        .filter(|item| match (&search, &needle) {
            (Some(s), Some(q)) => s.columns.iter().any(|col| match item.get(*col) {
                Some(v) => value_as_text(v).to_lowercase().contains(q.as_str()),
                None => false,
            }),
            _ => true,
        })
        .collect();

    sort_documents(&mut matched, sort);

    Ok(paginate(&matched, request.page).map(Value::clone))
}
