//! Mock document store backed by a JSON fixture file of `{collection: [documents]}`.

use crate::error::{AppError, ConfigError};
use crate::pagination::PaginatedResult;
use crate::query::{value_as_text, ListRequest};
use crate::service::memory::list_documents;
use crate::service::Paginator;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct FixtureStore {
    collections: HashMap<String, Arc<Vec<Value>>>,
}

impl FixtureStore {
    pub fn empty() -> Self {
        FixtureStore::default()
    }

    /// Top-level keys whose value is not an array are ignored.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(raw).map_err(|e| ConfigError::Load(format!("fixtures: {}", e)))?;
        let Value::Object(map) = root else {
            return Err(ConfigError::Load("fixtures: top level must be an object".into()));
        };
        let collections = map
            .into_iter()
            .filter_map(|(name, v)| match v {
                Value::Array(items) => Some((name, Arc::new(items))),
                _ => None,
            })
            .collect();
        Ok(FixtureStore { collections })
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), collections = store.collections.len(), "fixtures loaded");
        Ok(store)
    }

    /// Unknown collections read as empty.
    pub fn list(&self, collection: &str) -> Arc<Vec<Value>> {
        self.collections.get(collection).cloned().unwrap_or_default()
    }

    pub fn find_by_id(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .get(collection)?
            .iter()
            .find(|item| item.get("id").map(value_as_text).as_deref() == Some(id))
            .cloned()
    }

    /// Filter, search, sort and page one collection.
    pub fn paginate_list(&self, collection: &str, request: &ListRequest) -> Result<PaginatedResult<Value>, AppError> {
        list_documents(&self.list(collection), request)
    }
}

/// Reads its collection from the store on every call.
pub struct DocumentStorePaginator {
    store: Arc<FixtureStore>,
    collection: String,
}

impl DocumentStorePaginator {
    pub fn new(store: Arc<FixtureStore>, collection: impl Into<String>) -> Self {
        DocumentStorePaginator {
            store,
            collection: collection.into(),
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<Value> {
        self.store.find_by_id(&self.collection, id)
    }
}

#[async_trait]
impl Paginator for DocumentStorePaginator {
    async fn paginate(&self, request: &ListRequest) -> Result<PaginatedResult<Value>, AppError> {
        self.store.paginate_list(&self.collection, request)
    }
}
