//! Operation timeouts

use anyhow::{anyhow, Result};
use std::future::Future;
use std::time::Duration;

/// Upper bounds for each CRUD operation of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Timeouts {
    /// Same bound for create/update/delete, a separate one for read
    pub const fn writes_and_read(writes: Duration, read: Duration) -> Self {
        Self {
            create: writes,
            read,
            update: writes,
            delete: writes,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::writes_and_read(Duration::from_secs(30 * 60), Duration::from_secs(5 * 60))
    }
}

/// Run `future`, failing if it does not finish within `limit`
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!(
            "{} did not complete within {}s",
            operation,
            limit.as_secs_f64()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_default_timeouts() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.create, Duration::from_secs(1800));
        assert_eq!(timeouts.update, Duration::from_secs(1800));
        assert_eq!(timeouts.delete, Duration::from_secs(1800));
        assert_eq!(timeouts.read, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_completes_within_limit() {
        let value = with_timeout("read", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(assert_ok!(value), 7);
    }

    #[tokio::test]
    async fn test_times_out() {
        let result: Result<()> = with_timeout("creating thing", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        let err = assert_err!(result);
        assert!(err.to_string().starts_with("creating thing did not complete within"));
    }

    #[tokio::test]
    async fn test_inner_error_is_kept() {
        let result: Result<()> =
            with_timeout("read", Duration::from_secs(1), async { Err(anyhow!("boom")) }).await;
        assert_eq!(assert_err!(result).to_string(), "boom");
    }
}
