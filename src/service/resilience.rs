//! Retry and deadline wrappers for backend calls.

use crate::error::AppError;
use std::future::Future;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero behaves as one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Re-run `op` on server-side failures. Client errors (4xx) are returned immediately.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_client_error() => return Err(e),
            Err(e) if attempt >= max => {
                tracing::error!(max_attempts = max, error = %e, "operation failed after all retries");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = max,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %e,
                    "operation failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

/// Fail with [`AppError::Timeout`] when `fut` does not finish within `limit`.
pub async fn with_timeout<T, Fut>(limit: Duration, fut: Fut) -> Result<T, AppError>
where
    Fut: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => {
            let ms = limit.as_millis() as u64;
            tracing::error!(timeout_ms = ms, "operation timeout");
            Err(AppError::Timeout(ms))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::from_millis(1000),
        }
    }

    fn db_error() -> AppError {
        AppError::Db(sqlx::Error::Protocol("connection reset".into()))
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let res = with_retry(policy(3), || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(db_error())
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(res.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let res: Result<(), _> = with_retry(policy(3), || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(db_error())
        })
        .await;
        assert!(matches!(res, Err(AppError::Db(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn client_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let res: Result<(), _> = with_retry(policy(5), || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AppError::InvalidArgument("bad filter".into()))
        })
        .await;
        assert!(matches!(res, Err(AppError::InvalidArgument(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let _ = with_retry(policy(0), || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(db_error())
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_fires() {
        let res: Result<(), _> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        let err = res.unwrap_err();
        assert!(matches!(err, AppError::Timeout(50)));
        assert_eq!(err.status(), axum::http::StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_operations_pass_through() {
        let res = with_timeout(Duration::from_secs(1), async { Ok::<_, AppError>("done") }).await;
        assert_eq!(res.unwrap(), "done");
    }
}
