use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Attempt bound and backoff for a retried fetch. The production default
/// matches the price-fetch policy: 3 attempts, 1 second apart. Tests
/// substitute a zero backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Runs an async operation with bounded attempts and a fixed backoff
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `max_attempts`: Total number of runs before giving up
/// - `backoff`: Sleep between failed attempts
///
/// # Returns
/// Either the first successful result or the last error
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    max_attempts: usize,
    backoff: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                warn!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, max_attempts, err
                );
                attempt += 1;
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn returns_value_when_third_attempt_succeeds() {
        let calls = Mutex::new(0usize);
        let result: Result<u32, String> = with_retry(
            || async {
                let mut calls = calls.lock().unwrap();
                *calls += 1;
                if *calls < 3 {
                    Err(format!("transient failure {calls}"))
                } else {
                    Ok(42)
                }
            },
            3,
            Duration::ZERO,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn returns_last_error_when_all_attempts_fail() {
        let calls = Mutex::new(0usize);
        let result: Result<u32, String> = with_retry(
            || async {
                let mut calls = calls.lock().unwrap();
                *calls += 1;
                Err(format!("failure {calls}"))
            },
            3,
            Duration::ZERO,
        )
        .await;

        assert_eq!(result.unwrap_err(), "failure 3");
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_after_success() {
        let calls = Mutex::new(0usize);
        let result: Result<u32, String> = with_retry(
            || async {
                *calls.lock().unwrap() += 1;
                Ok(7)
            },
            3,
            Duration::ZERO,
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
