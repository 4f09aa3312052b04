use crate::metadata::ProviderError;
use core::time::Duration;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Instant;
use url::Url;

const LOG_TARGET: &str = "      http";

/// Timeout applied to each individual request attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Maximum number of attempts per request (the original plus retries).
const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff between attempts.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// Number of host errors within [`BREAKER_WINDOW`] that opens the circuit.
const BREAKER_MAX_ERRORS: usize = 50;

/// Sliding window over which host errors are counted.
const BREAKER_WINDOW: Duration = Duration::from_secs(30);

/// HTTP client with bounded retries, exponential backoff, and a per-host
/// circuit breaker.
///
/// Transport errors and 5xx responses are retried up to [`MAX_ATTEMPTS`] times
/// and counted against the host's breaker; once a host accumulates
/// [`BREAKER_MAX_ERRORS`] errors within the sliding window, further requests to
/// it are shed immediately with [`ProviderError::CircuitBreakerOpen`] instead
/// of paying the per-call cost. Non-5xx responses are returned to the caller
/// untouched; interpreting them is the provider's job.
#[derive(Debug)]
pub struct ResilientClient {
    client: reqwest::Client,
    breaker: CircuitBreaker,
}

impl ResilientClient {
    /// Create a client with the default request policy.
    pub fn new(user_agent: &str) -> crate::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().user_agent(user_agent).timeout(REQUEST_TIMEOUT).build()?,
            breaker: CircuitBreaker::new(BREAKER_MAX_ERRORS, BREAKER_WINDOW),
        })
    }

    /// Send a GET request, with optional `Accept` and `Authorization` header values.
    pub async fn get(&self, url: &Url, accept: Option<&str>, authorization: Option<&str>) -> Result<reqwest::Response, ProviderError> {
        let host = url.host_str().unwrap_or_default().to_string();

        let mut attempt = 0;
        loop {
            if self.breaker.is_open(&host) {
                log::debug!(target: LOG_TARGET, "Shedding request to '{url}': circuit breaker open for host '{host}'");
                return Err(ProviderError::CircuitBreakerOpen(host));
            }

            let mut request = self.client.get(url.clone());
            if let Some(accept) = accept {
                request = request.header(reqwest::header::ACCEPT, accept);
            }
            if let Some(authorization) = authorization {
                request = request.header(reqwest::header::AUTHORIZATION, authorization);
            }

            let outcome = request.send().await;
            attempt += 1;

            let retryable = match &outcome {
                Ok(response) => response.status().is_server_error(),
                Err(_) => true,
            };

            if !retryable {
                self.breaker.record_success(&host);
                return outcome.map_err(|e| ProviderError::Transport {
                    url: url.clone(),
                    source: e,
                });
            }

            self.breaker.record_error(&host);

            if attempt >= MAX_ATTEMPTS {
                return match outcome {
                    Ok(response) => Ok(response),
                    Err(e) => Err(ProviderError::Transport {
                        url: url.clone(),
                        source: e,
                    }),
                };
            }

            let delay = RETRY_BASE_DELAY * 2_u32.pow(attempt - 1);
            log::debug!(target: LOG_TARGET, "Retrying request to '{url}' (attempt {attempt} failed, waiting {}ms)", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }
}

/// Sliding-window error counter per host.
#[derive(Debug)]
struct CircuitBreaker {
    max_errors: usize,
    window: Duration,
    errors: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl CircuitBreaker {
    fn new(max_errors: usize, window: Duration) -> Self {
        Self {
            max_errors,
            window,
            errors: Mutex::new(HashMap::new()),
        }
    }

    fn is_open(&self, host: &str) -> bool {
        let mut errors = self.errors.lock().expect("lock not poisoned");
        let Some(timestamps) = errors.get_mut(host) else {
            return false;
        };

        Self::prune(timestamps, self.window);
        timestamps.len() >= self.max_errors
    }

    fn record_error(&self, host: &str) {
        let mut errors = self.errors.lock().expect("lock not poisoned");
        let timestamps = errors.entry(host.to_string()).or_default();
        Self::prune(timestamps, self.window);
        timestamps.push_back(Instant::now());
    }

    fn record_success(&self, host: &str) {
        let mut errors = self.errors.lock().expect("lock not poisoned");
        let _ = errors.remove(host);
    }

    fn prune(timestamps: &mut VecDeque<Instant>, window: Duration) {
        let now = Instant::now();
        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) > window {
                let _ = timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaker_opens_after_threshold() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));

        assert!(!breaker.is_open("github.com"));
        breaker.record_error("github.com");
        breaker.record_error("github.com");
        assert!(!breaker.is_open("github.com"));

        breaker.record_error("github.com");
        assert!(breaker.is_open("github.com"));

        // other hosts are unaffected
        assert!(!breaker.is_open("gitlab.com"));
    }

    #[test]
    fn test_breaker_success_resets_host() {
        let breaker = CircuitBreaker::new(2, Duration::from_secs(30));
        breaker.record_error("github.com");
        breaker.record_error("github.com");
        assert!(breaker.is_open("github.com"));

        breaker.record_success("github.com");
        assert!(!breaker.is_open("github.com"));
    }

    #[test]
    fn test_breaker_window_expiry() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(0));
        breaker.record_error("github.com");

        // With a zero-length window every recorded error is already stale.
        std::thread::sleep(Duration::from_millis(5));
        assert!(!breaker.is_open("github.com"));
    }
}
