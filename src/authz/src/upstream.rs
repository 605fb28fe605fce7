//! Bounded calls into external collaborators (credential and resource stores)

use crate::error::{AuthzError, Result};
use std::future::Future;
use std::time::Duration;

/// Default deadline for a single external lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs `lookup` with a deadline
///
/// A timeout surfaces as [`AuthzError::UpstreamUnavailable`], never as a deny.
pub(crate) async fn bounded<T, F>(what: &str, timeout: Duration, lookup: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, lookup).await {
        Ok(result) => result,
        Err(_) => Err(AuthzError::UpstreamUnavailable(format!(
            "{} lookup timed out after {}ms",
            what,
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let value = bounded("principal", Duration::from_millis(100), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_unavailable() {
        let result: Result<()> = bounded("principal", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AuthzError::UpstreamUnavailable(_)));
        assert!(err.is_retryable());
    }
}
