//! Host failover for transport failures.
//!
//! Every failure is retried immediately on the other host; the loop does not
//! look at why an attempt failed.

use anyhow::Result;
use log::{debug, warn};

use crate::config::Hosts;
use crate::error::ApiError;

/// Runs `operation` against alternating hosts until it succeeds or
/// `max_attempts` attempts have failed.
///
/// `operation` receives the base URL for the current attempt. Attempt `0`
/// and every even attempt use the primary host, odd attempts the fallback.
pub async fn with_failover<F, Fut, T>(
    operation_name: &str,
    hosts: &Hosts,
    max_attempts: u32,
    operation: F,
) -> Result<T, ApiError>
where
    F: Fn(String) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    for attempt in 0..max_attempts {
        let host = hosts.for_attempt(attempt);

        match operation(host.to_string()).await {
            Ok(result) => {
                debug!(
                    "{}: succeeded on attempt {}/{} via {}",
                    operation_name,
                    attempt + 1,
                    max_attempts,
                    host
                );
                return Ok(result);
            }
            Err(e) => {
                warn!(
                    "{}: attempt {}/{} via {} failed ({:#})",
                    operation_name,
                    attempt + 1,
                    max_attempts,
                    host,
                    e
                );
            }
        }
    }

    Err(ApiError::Unreachable {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn hosts() -> Hosts {
        Hosts {
            primary: "http://a/".to_string(),
            fallback: "http://b/".to_string(),
        }
    }

    #[tokio::test]
    async fn test_with_failover_success() {
        let result = with_failover("test", &hosts(), 4, |_| async {
            Ok::<_, anyhow::Error>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[test_log::test(tokio::test)]
    async fn test_with_failover_alternates_hosts_until_exhausted() {
        for max_attempts in 1..=6 {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let seen_clone = Arc::clone(&seen);

            let result = with_failover("test", &hosts(), max_attempts, |host| {
                let seen = Arc::clone(&seen_clone);
                async move {
                    seen.lock().unwrap().push(host);
                    Err::<(), _>(anyhow::anyhow!("connection refused"))
                }
            })
            .await;

            assert!(matches!(
                result,
                Err(ApiError::Unreachable { attempts }) if attempts == max_attempts
            ));

            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), max_attempts as usize);
            for (attempt, host) in seen.iter().enumerate() {
                let expected = if attempt % 2 == 0 { "http://a/" } else { "http://b/" };
                assert_eq!(host, expected, "attempt {}", attempt);
            }
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_with_failover_stops_after_first_success() {
        let max_attempts = 5;
        for succeed_on in 0..max_attempts {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let seen_clone = Arc::clone(&seen);

            let result = with_failover("test", &hosts(), max_attempts, |host| {
                let seen = Arc::clone(&seen_clone);
                async move {
                    let mut seen = seen.lock().unwrap();
                    seen.push(host);
                    if seen.len() as u32 > succeed_on {
                        Ok(seen.len())
                    } else {
                        Err(anyhow::anyhow!("operation timed out"))
                    }
                }
            })
            .await;

            assert_eq!(result.unwrap(), succeed_on as usize + 1);
            assert_eq!(seen.lock().unwrap().len(), succeed_on as usize + 1);
        }
    }

    #[tokio::test]
    async fn test_with_failover_has_no_backoff() {
        let start = std::time::Instant::now();
        let result = with_failover("test", &hosts(), 4, |_| async {
            Err::<(), _>(anyhow::anyhow!("connection reset"))
        })
        .await;

        assert!(result.unwrap_err().is_unreachable());
        assert!(start.elapsed() < std::time::Duration::from_millis(500));
    }
}
