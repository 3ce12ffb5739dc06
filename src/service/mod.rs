//! Paginated reads over a relational table, the fixture document store, or an in-memory list.

mod document;
mod executor;
mod memory;
mod relational;
mod resilience;

use crate::error::AppError;
use crate::pagination::PaginatedResult;
use crate::query::ListRequest;
use async_trait::async_trait;
use serde_json::Value;

pub use document::{DocumentStorePaginator, FixtureStore};
pub use executor::{PgExecutor, SqlExecutor};
pub use memory::{list_documents, InMemoryPaginator};
pub use relational::{parse_total, RelationalPaginator};
pub use resilience::{with_retry, with_timeout, RetryPolicy};

/// One page of records plus counts, whatever the backend.
///
/// Every implementation validates the request the same way, so a request rejected by one
/// backend is rejected by all of them.
#[async_trait]
pub trait Paginator: Send + Sync {
    async fn paginate(&self, request: &ListRequest) -> Result<PaginatedResult<Value>, AppError>;
}
