//! Paginated reads from a relational table: COUNT, then SELECT with LIMIT/OFFSET.

use crate::error::AppError;
use crate::pagination::PaginatedResult;
use crate::query::{parse_int_safe, value_as_text, ListRequest};
use crate::service::{Paginator, SqlExecutor};
use crate::sql::{build_list_query, select_by_id};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub struct RelationalPaginator {
    executor: Arc<dyn SqlExecutor>,
    table: String,
    columns: Vec<String>,
}

impl RelationalPaginator {
    /// `columns` empty selects `*`.
    pub fn new(executor: Arc<dyn SqlExecutor>, table: impl Into<String>, columns: Vec<String>) -> Self {
        RelationalPaginator {
            executor,
            table: table.into(),
            columns,
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Value>, AppError> {
        let q = select_by_id(&self.table, &self.columns, id)?;
        let rows = self.executor.fetch_all(&q).await?;
        Ok(rows.into_iter().next())
    }
}

/// COUNT(*) comes back as int8 from Postgres but may be text or float elsewhere; anything non-numeric is 0.
pub fn parse_total(v: &Value) -> u64 {
    let n = match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        other => parse_int_safe(Some(&value_as_text(other)), 0, None, None),
    };
    n.max(0) as u64
}

#[async_trait]
impl Paginator for RelationalPaginator {
    async fn paginate(&self, request: &ListRequest) -> Result<PaginatedResult<Value>, AppError> {
        let query = build_list_query(&self.table, &self.columns, request)?;

        let count_rows = self.executor.fetch_all(&query.count_query()).await?;
        let total = count_rows
            .first()
            .and_then(|row| row.get("total"))
            .map(parse_total)
            .unwrap_or(0);

        let rows = self.executor.fetch_all(&query.select_query()).await?;
        tracing::debug!(table = %self.table, total, returned = rows.len(), "relational page");
        Ok(PaginatedResult::new(rows, total, request.page))
    }
}
