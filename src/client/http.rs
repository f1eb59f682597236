//! Reqwest-backed batch client.
//!
//! Destination APIs sit on internal management networks behind self-signed
//! certificates, so certificate verification is relaxed for this client.
//! Every call carries an explicit timeout; slots fail independently.

use std::time::Duration;

use futures::future::join_all;

use crate::errors::{Error, Result};

use super::{Call, CallError, CallOutcome, CallRequest, CallResponse, Method};

/// [`super::BatchClient`] implementation over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpBatchClient {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HttpBatchClient {
    /// Build a client with the given default per-call timeout.
    pub fn new(default_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| {
                Error::config_with_source("Failed to build destination HTTP client", Box::new(err))
            })?;

        Ok(Self { client, default_timeout })
    }

    async fn execute(&self, request: CallRequest) -> Call {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let outcome = self.dispatch(&request, timeout).await;

        if let Err(error) = &outcome {
            tracing::debug!(
                error = %error,
                method = %request.method,
                url = %request.url,
                "Destination call failed"
            );
        }

        Call { request, outcome }
    }

    async fn dispatch(&self, request: &CallRequest, timeout: Duration) -> CallOutcome {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Put => self.client.put(&request.url),
        };
        builder = builder.timeout(timeout);
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| classify_send_error(err, request, timeout))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|err| {
            CallError::body(request.method.as_str(), &request.url, err.to_string())
        })?;
        let body = parse_body(&text).map_err(|message| {
            CallError::body(request.method.as_str(), &request.url, message)
        })?;

        Ok(CallResponse { status, body })
    }
}

#[async_trait::async_trait]
impl super::BatchClient for HttpBatchClient {
    async fn submit(&self, requests: Vec<CallRequest>) -> Vec<Call> {
        join_all(requests.into_iter().map(|request| self.execute(request))).await
    }
}

fn classify_send_error(err: reqwest::Error, request: &CallRequest, timeout: Duration) -> CallError {
    let method = request.method.as_str();
    if err.is_timeout() {
        CallError::timeout(method, &request.url, timeout.as_millis() as u64)
    } else if err.is_connect() {
        CallError::connect(method, &request.url, err.to_string())
    } else {
        CallError::request(method, &request.url, err.to_string())
    }
}

/// Decode a response body. Empty bodies are `Null`, anything else must be
/// valid JSON.
fn parse_body(text: &str) -> std::result::Result<serde_json::Value, String> {
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(text).map_err(|err| err.to_string())
}
