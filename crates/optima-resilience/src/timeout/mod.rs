//! Timeout wrapper for async operations.

use optima_core::{OptimaError, OptimaResult};
use std::time::Duration;

/// Wraps an async operation with a timeout.
///
/// The operation's future is dropped when the timeout fires, so a late
/// result is discarded.
pub async fn with_timeout<F, Fut, T>(duration: Duration, f: F) -> OptimaResult<T>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = OptimaResult<T>>,
{
    tokio::time::timeout(duration, f())
        .await
        .map_err(|_| OptimaError::Timeout(format!("Operation timed out after {:?}", duration)))?
}

/// Applies `duration` when present, otherwise runs the operation unbounded.
pub async fn with_optional_timeout<F, Fut, T>(duration: Option<Duration>, f: F) -> OptimaResult<T>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = OptimaResult<T>>,
{
    match duration {
        Some(duration) => with_timeout(duration, f).await,
        None => f().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_success() {
        let result = with_timeout(Duration::from_secs(1), || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_timeout_exceeded() {
        let result = with_timeout(Duration::from_millis(10), || async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(42)
        })
        .await;

        assert!(matches!(result, Err(OptimaError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_no_timeout_passes_errors_through() {
        let result: OptimaResult<i32> =
            with_optional_timeout(None, || async { Err(OptimaError::validation("bad")) }).await;
        assert!(matches!(result, Err(OptimaError::Validation(_))));
    }
}
