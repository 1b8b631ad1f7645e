// src/llm/http_client.rs
// Shared HTTP client with retry for provider APIs

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AnalyzerError, Result};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// How many times a transient failure is resent, and how long to wait between sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each one after
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Wait before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_backoff.saturating_mul(1u32 << retry.min(16))
    }

    fn allows(&self, retry: u32) -> bool {
        retry < self.max_retries
    }
}

/// Rate limits and server errors are worth resending
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Only failures where the request never reached the provider are safe to resend
fn is_transient_send_error(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout()
}

pub struct LlmHttpClient {
    client: Client,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
}

impl LlmHttpClient {
    pub fn new(request_timeout: Duration) -> Self {
        let connect_timeout = Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS).min(request_timeout);
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            request_timeout,
            connect_timeout,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Send and return the response body as text.
    ///
    /// `build` is called once per attempt so callers own URL, headers, and auth.
    pub async fn post_for_text<F>(&self, request_id: &str, body: String, build: F) -> Result<String>
    where
        F: Fn(&Client, String) -> RequestBuilder,
    {
        let response = self.post_for_response(request_id, body, build).await?;
        Ok(response.text().await?)
    }

    /// Send with the same retry rules and hand back the live response (for SSE bodies)
    pub async fn post_for_response<F>(&self, request_id: &str, body: String, build: F) -> Result<Response>
    where
        F: Fn(&Client, String) -> RequestBuilder,
    {
        let mut retry = 0u32;

        loop {
            let failure = match build(&self.client, body.clone()).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(request_id = %request_id, retries = retry, "Provider request succeeded");
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    let detail = response.text().await.unwrap_or_default();
                    let error = AnalyzerError::Provider(format!("API error {}: {}", status, detail));
                    if !is_transient_status(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => {
                    if !is_transient_send_error(&e) {
                        return Err(AnalyzerError::Provider(format!("Request failed: {}", e)));
                    }
                    AnalyzerError::Provider(format!("Request failed after retries: {}", e))
                }
            };

            if !self.retry.allows(retry) {
                return Err(failure);
            }

            let wait = self.retry.backoff(retry);
            warn!(
                request_id = %request_id,
                error = %failure,
                retry = retry + 1,
                wait_ms = wait.as_millis() as u64,
                "Transient provider failure, retrying"
            );
            tokio::time::sleep(wait).await;
            retry += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_timeout_capped_by_request_timeout() {
        let client = LlmHttpClient::new(Duration::from_secs(60));
        assert_eq!(client.connect_timeout, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));
        assert_eq!(client.retry, RetryPolicy::default());

        let short = LlmHttpClient::new(Duration::from_secs(2));
        assert_eq!(short.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
        };
        let waits: Vec<u128> = (0..3).map(|r| policy.backoff(r).as_millis()).collect();
        assert_eq!(waits, vec![100, 200, 400]);
        assert!(policy.allows(2));
        assert!(!policy.allows(3));
        assert!(!RetryPolicy::none().allows(0));
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_status(StatusCode::BAD_GATEWAY));
        assert!(!is_transient_status(StatusCode::UNAUTHORIZED));
        assert!(!is_transient_status(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_connection_refused_is_provider_error() {
        let client = LlmHttpClient::new(Duration::from_millis(500)).with_retry(RetryPolicy {
            max_retries: 1,
            base_backoff: Duration::from_millis(10),
        });
        let err = client
            .post_for_text("test", "{}".into(), |c, body| {
                c.post("http://127.0.0.1:1")
                    .header("Content-Type", "application/json")
                    .body(body)
            })
            .await
            .unwrap_err();
        assert!(err.is_provider_failure());
        assert!(err.to_string().contains("Request failed"), "got: {}", err);
    }
}
