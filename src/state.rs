//! Shared application state for all routes.

use crate::config::{EntityRegistry, ServerSettings};
use crate::service::{FixtureStore, RetryPolicy, SqlExecutor};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<EntityRegistry>,
    pub sql: Arc<dyn SqlExecutor>,
    /// Backs both the `nosql` and `fake` data sources.
    pub documents: Arc<FixtureStore>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl AppState {
    pub fn new(registry: EntityRegistry, sql: Arc<dyn SqlExecutor>, documents: FixtureStore) -> Self {
        let defaults = ServerSettings::default();
        AppState {
            registry: Arc::new(registry),
            sql,
            documents: Arc::new(documents),
            request_timeout: defaults.request_timeout,
            retry: defaults.retry,
        }
    }

    /// Take timeout and retry policy from settings.
    pub fn with_settings(mut self, settings: &ServerSettings) -> Self {
        self.request_timeout = settings.request_timeout;
        self.retry = settings.retry;
        self
    }
}
