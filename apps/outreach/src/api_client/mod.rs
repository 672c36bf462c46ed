//! Resilient request client, the single point of entry for every backend call.
//!
//! Each attempt is bounded by the configured timeout. Network failures and
//! timeouts are retried with exponential backoff (1s, 2s, 4s, ...). A response
//! with a non-2xx status is never retried.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RequestConfig;

pub mod transport;

pub use transport::{Attempt, ReqwestTransport, Transport, TransportError, TransportResponse};

const BACKOFF_BASE_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The server answered with a non-2xx status. Displays as the server's message.
    #[error("{detail}")]
    Server { status: u16, detail: String },

    #[error("Invalid JSON in response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the failure happened before any response arrived.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout(_))
    }
}

/// Delay inserted before attempt `attempt_index + 1`.
pub fn backoff_delay(attempt_index: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(2u64.saturating_pow(attempt_index)))
}

/// Stateless and cheap to clone; concurrent calls do not interact.
#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    config: RequestConfig,
}

impl RequestClient {
    pub fn new(config: RequestConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new()?)))
    }

    pub fn with_transport(config: RequestConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Performs one logical JSON request, retrying transient failures.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let mut index = 0;
        loop {
            let attempt = Attempt {
                url: self.config.url_for(endpoint),
                endpoint,
                method: method.clone(),
                body,
                index,
            };

            match self.attempt(&attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && index < self.config.max_retries => {
                    let delay = backoff_delay(index);
                    warn!(
                        "{} {} attempt {} failed ({}), retrying after {}ms...",
                        method,
                        endpoint,
                        index + 1,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    index += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Convenience method that calls the backend and deserializes the result.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let value = self.call(endpoint, method, body).await?;
        serde_json::from_value(value).map_err(ApiError::Serialization)
    }

    async fn attempt(&self, attempt: &Attempt<'_>) -> Result<Value, ApiError> {
        debug!(
            "{} {} (attempt {})",
            attempt.method,
            attempt.endpoint,
            attempt.index + 1
        );

        // Dropping the send future on expiry cancels the in-flight request.
        let response = tokio::time::timeout(self.config.timeout, self.transport.send(attempt))
            .await
            .map_err(|_| ApiError::Timeout(self.config.timeout))??;

        if !response.is_success() {
            let detail = error_detail(&response);
            debug!(
                "{} {} rejected with {}: {}",
                attempt.method, attempt.endpoint, response.status, detail
            );
            return Err(ApiError::Server {
                status: response.status,
                detail,
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }
}

/// Picks the human-readable message out of an error response.
fn error_detail(response: &TransportResponse) -> String {
    let fallback = || format!("API Error: {}", response.status);

    let Ok(body) = serde_json::from_slice::<Value>(&response.body) else {
        return if response.status_text.is_empty() {
            fallback()
        } else {
            response.status_text.clone()
        };
    };

    match body.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return detail.clone(),
        // Validation failures arrive as a list of {loc, msg, type} objects.
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }
        _ => {}
    }

    match body.get("message") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        _ => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::Instant;

    use super::transport::scripted::{ScriptedTransport, Step};
    use super::*;

    fn client(max_retries: u32, steps: Vec<Step>) -> (RequestClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(steps));
        let timeout = Duration::from_millis(30_000);
        let config = RequestConfig::new("http://backend.test", timeout, max_retries).unwrap();
        (RequestClient::with_transport(config, transport.clone()), transport)
    }

    #[test]
    fn test_backoff_doubles_from_one_second() {
        assert_eq!(backoff_delay(0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_backoff_saturates_instead_of_overflowing() {
        assert_eq!(backoff_delay(200), Duration::from_millis(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_parsed_body_on_first_attempt() {
        let (client, transport) = client(2, vec![Step::ok(json!({"role": "Engineer"}))]);
        let body = json!({"url": "https://x"});

        let value = client
            .call("/api/extract-job", Method::POST, Some(&body))
            .await
            .unwrap();

        assert_eq!(value, json!({"role": "Engineer"}));
        let seen = transport.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "http://backend.test/api/extract-job");
        assert_eq!(seen[0].method, Method::POST);
        assert_eq!(seen[0].body, Some(body));
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_network_failures_then_success() {
        let (client, transport) = client(
            2,
            vec![
                Step::Fail("connection refused"),
                Step::Fail("connection reset"),
                Step::ok(json!({"role": "Engineer", "company": "Acme"})),
            ],
        );
        let started = Instant::now();

        let value = client
            .call("/api/extract-job", Method::POST, Some(&json!({"url": "https://x"})))
            .await
            .unwrap();

        assert_eq!(value["role"], "Engineer");
        assert_eq!(transport.attempts(), 3);
        assert!(started.elapsed() >= Duration::from_millis(3000));

        let seen = transport.seen();
        assert_eq!(seen[1].at - seen[0].at, Duration::from_millis(1000));
        assert_eq!(seen[2].at - seen[1].at, Duration::from_millis(2000));
        assert_eq!(seen.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failures_exhaust_retries() {
        let (client, transport) = client(
            2,
            vec![
                Step::Fail("down"),
                Step::Fail("down"),
                Step::Fail("still down"),
            ],
        );

        let err = client
            .call("/api/extract-job", Method::POST, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Network(ref e) if e.0 == "still down"));
        assert_eq!(transport.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_makes_a_single_attempt() {
        let (client, transport) = client(0, vec![Step::Fail("down")]);
        let err = client.call("/x", Method::GET, None).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_is_never_retried() {
        let rejected = Step::status(422, "Unprocessable Entity", r#"{"detail":"bad url"}"#);
        let (client, transport) = client(3, vec![rejected]);
        let started = Instant::now();

        let err = client
            .call("/api/extract-job", Method::POST, Some(&json!({"url": "nope"})))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "bad url");
        assert!(matches!(err, ApiError::Server { status: 422, .. }));
        assert_eq!(transport.attempts(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_5xx_is_terminal_too() {
        let (client, transport) = client(3, vec![Step::status(503, "Service Unavailable", "")]);
        let err = client.call("/x", Method::POST, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Service Unavailable");
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unparsable_error_body_falls_back_to_status_text() {
        let html = Step::status(500, "Internal Server Error", "<html>oops</html>");
        let (client, _) = client(0, vec![html]);
        let err = client.call("/x", Method::POST, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_status_text_uses_status_code() {
        let (client, _) = client(0, vec![Step::status(599, "", "not json")]);
        let err = client.call("/x", Method::POST, None).await.unwrap_err();
        assert_eq!(err.to_string(), "API Error: 599");
    }

    #[tokio::test(start_paused = true)]
    async fn test_json_error_without_detail_uses_status_code() {
        let (client, _) = client(0, vec![Step::status(400, "Bad Request", r#"{"error": true}"#)]);
        let err = client.call("/x", Method::POST, None).await.unwrap_err();
        assert_eq!(err.to_string(), "API Error: 400");
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_field_is_used_when_detail_is_absent() {
        let (client, _) = client(
            0,
            vec![Step::status(
                500,
                "Internal Server Error",
                r#"{"error": true, "message": "Failed to extract job data", "status_code": 500}"#,
            )],
        );
        let err = client.call("/x", Method::POST, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to extract job data");
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_detail_list_is_joined() {
        let body = r#"{"detail":[
            {"loc":["body","url"],"msg":"invalid or missing URL scheme","type":"url_parsing"},
            {"loc":["body","x"],"msg":"field required","type":"missing"}
        ]}"#;
        let (client, _) = client(0, vec![Step::status(422, "Unprocessable Entity", body)]);
        let err = client.call("/x", Method::POST, None).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid or missing URL scheme; field required");
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_success_body_is_terminal() {
        let (client, transport) = client(2, vec![Step::status(200, "OK", "{not json")]);
        let err = client.call("/x", Method::POST, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_at_the_deadline_not_before() {
        let (client, transport) = client(0, vec![Step::Hang(Duration::from_secs(120))]);
        let started = Instant::now();

        let err = client.call("/x", Method::POST, None).await.unwrap_err();

        assert!(matches!(err, ApiError::Timeout(d) if d == Duration::from_secs(30)));
        assert_eq!(started.elapsed(), Duration::from_secs(30));
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_retried_like_a_network_error() {
        let (client, transport) = client(
            1,
            vec![Step::Hang(Duration::from_secs(60)), Step::ok(json!({"ok": true}))],
        );
        let started = Instant::now();

        let value = client.call("/x", Method::POST, None).await.unwrap();

        assert_eq!(value, json!({"ok": true}));
        assert_eq!(transport.attempts(), 2);
        // 30s deadline + 1s backoff
        assert_eq!(started.elapsed(), Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_json_reports_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Expected {
            role: String,
        }
        let (client, _) = client(0, vec![Step::ok(json!({"role": 42}))]);
        let err = client
            .call_json::<Expected>("/x", Method::POST, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }
}
