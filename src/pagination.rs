//! The `{data, meta}` envelope every paginator returns.

use crate::query::PageRequest;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, page: PageRequest) -> Self {
        let size = page.page_size.max(1) as u64;
        PageMeta {
            total,
            page: page.page,
            page_size: page.page_size,
            total_pages: total.div_ceil(size).max(1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> PaginatedResult<T> {
    /// `total` is the match count before paging, not `data.len()`.
    pub fn new(data: Vec<T>, total: u64, page: PageRequest) -> Self {
        PaginatedResult {
            data,
            meta: PageMeta::new(total, page),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meta.total == 0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Slice an already-materialized sequence into one page.
pub fn paginate<T: Clone>(items: &[T], page: PageRequest) -> PaginatedResult<T> {
    let start = usize::try_from(page.offset()).unwrap_or(usize::MAX).min(items.len());
    let end = start.saturating_add(page.page_size as usize).min(items.len());
    PaginatedResult::new(items[start..end].to_vec(), items.len() as u64, page)
}
