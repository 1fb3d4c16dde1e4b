//! Retry and backoff utilities for Gemini API calls.
//!
//! Individual HTTP calls are retried on transient network failures and on
//! rate limiting. The generation workflow as a whole is never retried.

use std::future::Future;
use std::time::Duration;

use super::client::ProviderError;

/// Default number of retry attempts for rate-limited requests.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default number of retry attempts for transient network errors.
pub const DEFAULT_NETWORK_RETRIES: u32 = 3;

/// Base delay for exponential backoff (1 second).
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Maximum delay cap for exponential backoff (60 seconds).
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Retry limits for a single API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub network_retries: u32,
    pub rate_limit_retries: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            network_retries: DEFAULT_NETWORK_RETRIES,
            rate_limit_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_max: DEFAULT_BACKOFF_MAX,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            network_retries: 0,
            rate_limit_retries: 0,
            ..Self::default()
        }
    }
}

/// What a call does on the server, which decides what may be repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Reads and text generation. Repeating them creates nothing remote.
    Idempotent,
    /// Starts a billable remote job. Only failures that prove the request
    /// never reached the server are repeated.
    CreatesJob,
}

/// Determine if a reqwest error is a transient network error that should be retried.
///
/// Connection failures always count. Timeouts and interrupted bodies may
/// happen after the server accepted the request, so they only count for
/// idempotent calls.
pub fn is_transient_network_error(error: &reqwest::Error, kind: CallKind) -> bool {
    if error.is_connect() {
        return true;
    }
    kind == CallKind::Idempotent && (error.is_timeout() || error.is_body())
}

/// Parse the Retry-After header value to get retry delay in seconds.
///
/// Only the integer-seconds form is understood.
pub fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Calculate exponential backoff delay with jitter.
///
/// Uses the formula: min(base * 2^attempt + jitter, max_delay)
/// where jitter is half the base, capped at 500ms.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exponential = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter_ms = (base.as_millis() as u64).min(1000);
    let jitter = Duration::from_millis(jitter_ms / 2);
    exponential.saturating_add(jitter).min(max)
}

/// Run `call` until it succeeds, retrying transient network errors and rate limits.
///
/// Rate limits honour the server's Retry-After value when present. Gateway
/// errors ([`ProviderError::Unavailable`]) share the network retry budget but
/// are only repeated for [`CallKind::Idempotent`] calls. Any other error is
/// returned immediately. When network retries run out the last transport
/// failure is reported as [`ProviderError::NetworkError`].
pub async fn with_retry<T, F, Fut>(
    what: &str,
    config: RetryConfig,
    kind: CallKind,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut network_attempt = 0u32;
    let mut rate_limit_attempt = 0u32;

    loop {
        match call().await {
            Ok(value) => return Ok(value),

            Err(ProviderError::Http(ref http_err)) if is_transient_network_error(http_err, kind) => {
                network_attempt += 1;
                if network_attempt > config.network_retries {
                    log::error!(
                        "{}: network error after {} attempts. Giving up. Error: {}",
                        what,
                        network_attempt,
                        http_err
                    );
                    return Err(ProviderError::NetworkError {
                        message: http_err.to_string(),
                        attempts: network_attempt,
                    });
                }

                let delay =
                    calculate_backoff(network_attempt - 1, config.backoff_base, config.backoff_max);
                log::warn!(
                    "{}: network error (attempt {}/{}): {}. Retrying in {:?}...",
                    what,
                    network_attempt,
                    config.network_retries + 1,
                    http_err,
                    delay
                );
                tokio::time::sleep(delay).await;
            }

            Err(ProviderError::RateLimit {
                message,
                retry_after_secs,
            }) => {
                rate_limit_attempt += 1;
                if rate_limit_attempt > config.rate_limit_retries {
                    log::error!(
                        "{}: rate limit exceeded after {} attempts. Giving up.",
                        what,
                        rate_limit_attempt
                    );
                    return Err(ProviderError::RateLimit {
                        message,
                        retry_after_secs,
                    });
                }

                let delay = match retry_after_secs {
                    Some(secs) => Duration::from_secs(secs).min(config.backoff_max),
                    None => calculate_backoff(
                        rate_limit_attempt - 1,
                        config.backoff_base,
                        config.backoff_max,
                    ),
                };
                log::info!(
                    "{}: rate limited (attempt {}/{}). Retrying in {:?}...",
                    what,
                    rate_limit_attempt,
                    config.rate_limit_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
            }

            Err(ProviderError::Unavailable { status, message }) if kind == CallKind::Idempotent => {
                network_attempt += 1;
                if network_attempt > config.network_retries {
                    log::error!(
                        "{}: service unavailable ({}) after {} attempts. Giving up.",
                        what,
                        status,
                        network_attempt
                    );
                    return Err(ProviderError::Unavailable { status, message });
                }

                let delay =
                    calculate_backoff(network_attempt - 1, config.backoff_base, config.backoff_max);
                log::warn!(
                    "{}: service unavailable ({}) (attempt {}/{}): {}. Retrying in {:?}...",
                    what,
                    status,
                    network_attempt,
                    config.network_retries + 1,
                    message,
                    delay
                );
                tokio::time::sleep(delay).await;
            }

            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_calculate_backoff_first_attempt() {
        let delay = calculate_backoff(0, Duration::from_secs(1), Duration::from_secs(60));
        assert!(delay >= Duration::from_secs(1));
        assert!(delay <= Duration::from_millis(1500));
    }

    #[test]
    fn test_calculate_backoff_grows() {
        let first = calculate_backoff(0, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX);
        let second = calculate_backoff(1, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX);
        let third = calculate_backoff(2, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX);
        assert!(second > first);
        assert!(third > second);
        assert!(third >= Duration::from_secs(4));
    }

    #[test]
    fn test_calculate_backoff_respects_max() {
        let delay = calculate_backoff(30, Duration::from_secs(1), Duration::from_secs(60));
        assert_eq!(delay, Duration::from_secs(60));
    }

    #[test]
    fn test_retry_config_none() {
        let config = RetryConfig::none();
        assert_eq!(config.network_retries, 0);
        assert_eq!(config.rate_limit_retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_retries_rate_limit_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = with_retry("test", RetryConfig::default(), CallKind::Idempotent, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ProviderError::RateLimit {
                        message: "slow down".to_string(),
                        retry_after_secs: Some(1),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_gives_up_after_rate_limit_retries() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            rate_limit_retries: 2,
            ..RetryConfig::default()
        };
        let result: Result<(), _> = with_retry("test", config, CallKind::Idempotent, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ProviderError::RateLimit {
                    message: "quota".to_string(),
                    retry_after_secs: None,
                })
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::RateLimit { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_does_not_retry_api_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry("test", RetryConfig::default(), CallKind::Idempotent, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ProviderError::Api {
                    status: 400,
                    message: "bad request".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Api { status: 400, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_retries_unavailable_for_reads() {
        let calls = AtomicU32::new(0);
        let result = with_retry("test", RetryConfig::default(), CallKind::Idempotent, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ProviderError::Unavailable {
                        status: 503,
                        message: "The model is overloaded".to_string(),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_gives_up_on_unavailable_after_network_budget() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            network_retries: 2,
            ..RetryConfig::default()
        };
        let result: Result<(), _> = with_retry("test", config, CallKind::Idempotent, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ProviderError::Unavailable {
                    status: 502,
                    message: "bad gateway".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Unavailable { status: 502, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_never_repeats_job_creation_on_unavailable() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry("test", RetryConfig::default(), CallKind::CreatesJob, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ProviderError::Unavailable {
                    status: 504,
                    message: "gateway timeout".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Unavailable { status: 504, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_repeats_job_creation_on_rate_limit() {
        let calls = AtomicU32::new(0);
        let result = with_retry("test", RetryConfig::default(), CallKind::CreatesJob, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ProviderError::RateLimit {
                        message: "slow down".to_string(),
                        retry_after_secs: Some(2),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
    }
}
