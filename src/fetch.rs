use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::error::GannotError;

pub trait RateLimiter: Send + Sync {
    fn pause(&self);
    fn backoff(&self, delay: Duration);
}

#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl RateLimiter for FixedDelay {
    fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }

    fn backoff(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NoDelay;

impl RateLimiter for NoDelay {
    fn pause(&self) {}

    fn backoff(&self, _delay: Duration) {}
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_secs(1),
        }
    }
}

enum Attempt<T> {
    Final(T),
    Retry(String),
}

#[derive(Clone)]
pub struct FetchClient {
    client: Client,
    policy: RetryPolicy,
    limiter: Arc<dyn RateLimiter>,
}

impl FetchClient {
    pub fn new(
        policy: RetryPolicy,
        timeout: Duration,
        limiter: Arc<dyn RateLimiter>,
    ) -> Result<Self, GannotError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gannot/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GannotError::HttpInit(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| GannotError::HttpInit(err.to_string()))?;
        Ok(Self {
            client,
            policy,
            limiter,
        })
    }

    pub fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<Response, GannotError> {
        self.send_with_retries(url, || {
            let mut request = self.client.get(url);
            if !params.is_empty() {
                request = request.query(params);
            }
            request
        })
    }

    pub fn post_json(&self, url: &str, body: &Value) -> Result<Response, GannotError> {
        self.send_with_retries(url, || self.client.post(url).json(body))
    }

    fn send_with_retries<F>(&self, url: &str, make_req: F) -> Result<Response, GannotError>
    where
        F: Fn() -> RequestBuilder,
    {
        run_with_retries(&self.policy, self.limiter.as_ref(), url, || {
            match make_req().send() {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if is_retryable_status(status) {
                        Attempt::Retry(format!("status {status}"))
                    } else {
                        Attempt::Final(response)
                    }
                }
                Err(err) => Attempt::Retry(err.to_string()),
            }
        })
    }
}

// Non-retryable statuses come back as Final even when they are errors;
// callers decide what a 404 means for them.
fn run_with_retries<T, F>(
    policy: &RetryPolicy,
    limiter: &dyn RateLimiter,
    url: &str,
    mut attempt: F,
) -> Result<T, GannotError>
where
    F: FnMut() -> Attempt<T>,
{
    let mut delay = policy.base_backoff;
    for round in 1..=policy.max_attempts {
        limiter.pause();
        match attempt() {
            Attempt::Final(value) => return Ok(value),
            Attempt::Retry(reason) => {
                if round == policy.max_attempts {
                    tracing::warn!(%url, %reason, "retry budget exhausted");
                    break;
                }
                limiter.backoff(delay);
                delay = delay.saturating_mul(2);
            }
        }
    }
    Err(GannotError::TransportExhausted {
        url: url.to_string(),
        attempts: policy.max_attempts,
    })
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 503)
}

pub fn encode_path_segment(value: &str) -> String {
    let mut encoded = String::new();
    for byte in value.as_bytes() {
        let ch = *byte as char;
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '~') {
            encoded.push(ch);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;

    use super::*;

    #[derive(Default)]
    struct RecordingLimiter {
        pauses: Mutex<usize>,
        backoffs: Mutex<Vec<Duration>>,
    }

    impl RateLimiter for RecordingLimiter {
        fn pause(&self) {
            *self.pauses.lock().unwrap() += 1;
        }

        fn backoff(&self, delay: Duration) {
            self.backoffs.lock().unwrap().push(delay);
        }
    }

    #[test]
    fn transient_failures_back_off_then_succeed() {
        let limiter = RecordingLimiter::default();
        let mut outcomes = vec![503u16, 503, 200].into_iter();
        let result = run_with_retries(
            &RetryPolicy::default(),
            &limiter,
            "http://example.test/x",
            || match outcomes.next().unwrap() {
                200 => Attempt::Final("payload"),
                status => Attempt::Retry(format!("status {status}")),
            },
        );
        assert_eq!(result.unwrap(), "payload");
        assert_eq!(*limiter.pauses.lock().unwrap(), 3);
        assert_eq!(
            *limiter.backoffs.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn exhausted_budget_reports_attempt_count() {
        let limiter = RecordingLimiter::default();
        let result: Result<(), _> = run_with_retries(
            &RetryPolicy::default(),
            &limiter,
            "http://example.test/x",
            || Attempt::Retry("status 429".to_string()),
        );
        assert_matches!(
            result.unwrap_err(),
            GannotError::TransportExhausted { attempts: 5, .. }
        );
        // no sleep after the final failed attempt
        assert_eq!(limiter.backoffs.lock().unwrap().len(), 4);
        assert_eq!(*limiter.pauses.lock().unwrap(), 5);
    }

    #[test]
    fn backoff_doubles_each_round() {
        let limiter = RecordingLimiter::default();
        let policy = RetryPolicy {
            max_attempts: 4,
            base_backoff: Duration::from_millis(100),
        };
        let _: Result<(), _> = run_with_retries(&policy, &limiter, "http://example.test/x", || {
            Attempt::Retry("connection reset".to_string())
        });
        assert_eq!(
            *limiter.backoffs.lock().unwrap(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
    }

    #[test]
    fn non_retryable_outcome_returns_immediately() {
        let limiter = RecordingLimiter::default();
        let result = run_with_retries(
            &RetryPolicy::default(),
            &limiter,
            "http://example.test/x",
            || Attempt::Final(404u16),
        );
        assert_eq!(result.unwrap(), 404);
        assert!(limiter.backoffs.lock().unwrap().is_empty());
        assert_eq!(*limiter.pauses.lock().unwrap(), 1);
    }

    #[test]
    fn client_builds_without_network() {
        let client = FetchClient::new(
            RetryPolicy::default(),
            Duration::from_secs(5),
            Arc::new(NoDelay),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn retryable_status_classification() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(500));
        assert!(!is_retryable_status(200));
    }

    #[test]
    fn path_segment_encoding() {
        assert_eq!(encode_path_segment("ENSG00000141510"), "ENSG00000141510");
        assert_eq!(encode_path_segment("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_path_segment("x.y-z_~"), "x.y-z_~");
    }
}
