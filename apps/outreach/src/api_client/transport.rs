//! The network seam under `RequestClient`. One `send` is one HTTP exchange;
//! timeout and retry policy live in the client, not here.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One try of a logical call. Lives only for the duration of that try.
#[derive(Debug, Clone)]
pub struct Attempt<'a> {
    /// Absolute URL: configured base + endpoint.
    pub url: String,
    pub endpoint: &'a str,
    pub method: Method,
    pub body: Option<&'a Value>,
    /// 0 for the first try.
    pub index: u32,
}

/// Whatever the server answered, success or not.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// Canonical reason phrase; may be empty.
    pub status_text: String,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// No response was received.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, attempt: &Attempt<'_>) -> Result<TransportResponse, TransportError>;
}

/// Production transport over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        // No client-level timeout: the per-attempt deadline is enforced by the caller.
        Ok(Self {
            client: Client::builder().build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, attempt: &Attempt<'_>) -> Result<TransportResponse, TransportError> {
        let mut request = self
            .client
            .request(attempt.method.clone(), &attempt.url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if let Some(body) = attempt.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError(format!("request to {} failed: {e}", attempt.endpoint)))?;

        let status = response.status();
        // A body cut off mid-stream is still a network failure, not a server answer.
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                TransportError(format!("reading response from {} failed: {e}", attempt.endpoint))
            })?;

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
