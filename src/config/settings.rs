//! Server settings read from the environment.

use crate::query::parse_int_safe;
use crate::service::RetryPolicy;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_FIXTURES_PATH: &str = "fixtures/fakedata.json";
pub const MAX_POOL_SIZE: u32 = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerSettings {
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub fixtures_path: String,
    /// Replaces the built-in entity set when present.
    pub entities_path: Option<String>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub pool_max: u32,
    pub body_limit: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings::from_vars(&HashMap::new())
    }
}

impl ServerSettings {
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Missing or malformed numbers fall back to their defaults.
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let text = |key: &str| vars.get(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let int = |key: &str, default: i64, min: i64, max: Option<i64>| {
            parse_int_safe(vars.get(key).map(String::as_str), default, Some(min), max)
        };

        ServerSettings {
            database_url: text("DATABASE_URL"),
            bind_addr: text("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            fixtures_path: text("FIXTURES_PATH").unwrap_or_else(|| DEFAULT_FIXTURES_PATH.into()),
            entities_path: text("ENTITIES_PATH"),
            request_timeout: Duration::from_millis(int("REQUEST_TIMEOUT_MS", 5000, 1, None) as u64),
            retry: RetryPolicy {
                max_attempts: int("DB_RETRY_ATTEMPTS", 3, 1, Some(10)) as u32,
                delay: Duration::from_millis(int("DB_RETRY_DELAY_MS", 1000, 0, None) as u64),
            },
            pool_max: int("DB_POOL_MAX", 10, 1, Some(MAX_POOL_SIZE as i64)) as u32,
            body_limit: int("BODY_LIMIT", 1024 * 1024, 1, None) as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults() {
        let s = ServerSettings::default();
        assert_eq!(s.database_url, None);
        assert_eq!(s.bind_addr, "0.0.0.0:3000");
        assert_eq!(s.fixtures_path, "fixtures/fakedata.json");
        assert_eq!(s.request_timeout, Duration::from_millis(5000));
        assert_eq!(s.retry, RetryPolicy::default());
        assert_eq!(s.pool_max, 10);
        assert_eq!(s.body_limit, 1024 * 1024);
    }

    #[test]
    fn overrides_and_clamping() {
        let s = ServerSettings::from_vars(&vars(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_POOL_MAX", "5000"),
            ("DB_RETRY_ATTEMPTS", "abc"),
            ("DB_RETRY_DELAY_MS", "250ms"),
            ("ENTITIES_PATH", "  "),
        ]));
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/app"));
        assert_eq!(s.bind_addr, "127.0.0.1:8080");
        assert_eq!(s.pool_max, 100);
        assert_eq!(s.retry.max_attempts, 3);
        assert_eq!(s.retry.delay, Duration::from_millis(250));
        assert_eq!(s.entities_path, None);
    }
}
