#![allow(dead_code)]

use async_trait::async_trait;
use entity_crud::sql::QueryBuf;
use entity_crud::{builtin_entities, resolve, AppError, AppState, FixtureStore, RetryPolicy, SqlExecutor};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FIXTURES: &str = include_str!("../../fixtures/fakedata.json");

/// Replays scripted results in order and records every statement it is asked to run.
#[derive(Default)]
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<Result<Vec<Value>, AppError>>>,
    seen: Mutex<Vec<(String, Vec<Value>)>>,
    unreachable: bool,
    latency: Option<Duration>,
}

impl ScriptedExecutor {
    pub fn new(responses: Vec<Result<Vec<Value>, AppError>>) -> Self {
        ScriptedExecutor {
            responses: Mutex::new(responses.into()),
            ..ScriptedExecutor::default()
        }
    }

    /// A COUNT answer followed by the page rows.
    pub fn page(total: u64, rows: Vec<Value>) -> Self {
        Self::new(vec![Ok(vec![serde_json::json!({ "total": total })]), Ok(rows)])
    }

    /// Fails every readiness ping.
    pub fn unreachable() -> Self {
        ScriptedExecutor {
            unreachable: true,
            ..ScriptedExecutor::default()
        }
    }

    /// Delay before every answer.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn seen(&self) -> Vec<(String, Vec<Value>)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlExecutor for ScriptedExecutor {
    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        self.seen.lock().unwrap().push((q.sql.clone(), q.params.clone()));
        if let Some(d) = self.latency {
            tokio::time::sleep(d).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.unreachable {
            Err(AppError::Db(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

pub fn fixtures() -> FixtureStore {
    FixtureStore::from_json_str(FIXTURES).unwrap()
}

/// State over the built-in entities and fixtures, retrying once with no delay.
pub fn state_with(sql: Arc<ScriptedExecutor>) -> AppState {
    let registry = resolve(&builtin_entities().unwrap()).unwrap();
    let mut state = AppState::new(registry, sql, fixtures());
    state.retry = RetryPolicy {
        max_attempts: 2,
        delay: Duration::ZERO,
    };
    state
}
