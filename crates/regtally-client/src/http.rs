//! Retrying HTTP layer over a pluggable transport.
//!
//! [`RetryingClient`] owns the attempt loop: request pacing, honoring the
//! server's `Retry-After` on 429, exponential backoff for transient
//! faults, and immediate failure for client errors and blocked (HTML)
//! responses. The transport itself is a trait so the loop can be driven
//! against a scripted transport in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, RETRY_AFTER};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::limit::RateLimiter;

/// Fallback wait when a 429 response carries no `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Consecutive 429 waits tolerated before giving up. The generic backoff
/// path is bounded by `max_retries`; this bounds the rate-limit path so a
/// server that always answers 429 cannot stall a run forever.
const MAX_RATE_LIMIT_WAITS: u32 = 8;

/// The slice of an HTTP response the retry loop needs.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed `Retry-After` header, in seconds.
    pub retry_after: Option<u64>,
    pub body: String,
}

/// Failures below the HTTP layer, before any retry policy applies.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
}

/// A single HTTP GET, no policy attached.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by [`reqwest::Client`].
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, RequestError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response.text().await.map_err(classify_reqwest_error)?;

        Ok(HttpResponse {
            status,
            retry_after,
            body,
        })
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connect(err.to_string())
    }
}

/// HTTP GET with pacing, bounded retries, and JSON decoding.
pub struct RetryingClient<T> {
    transport: T,
    limiter: RateLimiter,
    max_retries: u32,
    backoff_factor: f64,
}

impl<T: HttpTransport> RetryingClient<T> {
    pub fn new(transport: T, limiter: RateLimiter, max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            transport,
            limiter,
            max_retries,
            backoff_factor,
        }
    }

    /// Issue a GET and decode the body as JSON.
    ///
    /// Timeouts, connection failures, and 5xx responses are retried up to
    /// `max_retries` times with `backoff_factor ** attempt` second sleeps.
    /// A 429 response sleeps for the server-requested interval without
    /// consuming a retry slot. Other 4xx responses, HTML bodies, and
    /// undecodable bodies fail immediately.
    pub async fn get(
        &mut self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<Value, RequestError> {
        let mut attempt: u32 = 0;
        let mut rate_limit_waits: u32 = 0;

        loop {
            self.limiter.wait().await;
            debug!(url = %url, attempt, "issuing GET");

            let failure = match self.transport.get(url, query).await {
                Ok(response) if response.status == 429 => {
                    rate_limit_waits += 1;
                    if rate_limit_waits > MAX_RATE_LIMIT_WAITS {
                        error!(url = %url, "server kept answering 429, giving up");
                        return Err(RequestError::Server { status: 429 });
                    }
                    let wait = response.retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                    warn!(wait_secs = wait, "rate limited by server");
                    sleep(Duration::from_secs(wait)).await;
                    // Server-directed waits do not consume a retry slot.
                    continue;
                }
                Ok(response) if (200..300).contains(&response.status) => {
                    return decode_body(url, &response.body);
                }
                Ok(response) if response.status >= 500 => {
                    warn!(status = response.status, attempt, "server error");
                    RequestError::Server {
                        status: response.status,
                    }
                }
                Ok(response) => {
                    // Client errors will not resolve by retrying.
                    return Err(RequestError::Status {
                        status: response.status,
                    });
                }
                Err(TransportError::Timeout) => {
                    warn!(attempt, "request timeout");
                    RequestError::Timeout
                }
                Err(TransportError::Connect(cause)) => {
                    warn!(attempt, cause = %cause, "connection error");
                    RequestError::Connect(cause)
                }
            };

            if attempt >= self.max_retries {
                return Err(failure);
            }
            let delay = self.backoff_factor.powi(attempt as i32);
            debug!(delay_secs = delay, "retrying after backoff");
            sleep(Duration::from_secs_f64(delay)).await;
            attempt += 1;
        }
    }
}

fn decode_body(url: &str, body: &str) -> Result<Value, RequestError> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(err) => {
            if looks_like_html(body) {
                error!(url = %url, "HTML response, API is likely blocking requests");
                Err(RequestError::Blocked)
            } else {
                error!(url = %url, error = %err, "invalid JSON response");
                Err(RequestError::Json(err.to_string()))
            }
        }
    }
}

/// Anti-bot and rate-limit pages arrive as HTML with a 200 status.
fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    let lowered = head
        .get(..15.min(head.len()))
        .unwrap_or_default()
        .to_ascii_lowercase();
    lowered.starts_with("<!doctype") || lowered.starts_with("<html")
}
