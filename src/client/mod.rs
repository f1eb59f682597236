//! Batched destination call contract and types.
//!
//! The reconciliation engine talks to destinations exclusively through
//! [`BatchClient`]: it hands over a batch of call descriptors and receives
//! paired request/response records back, in submission order. How the calls
//! are executed is an implementation concern; [`http::HttpBatchClient`] is
//! the reqwest-backed implementation used in production.

pub mod error;
pub mod http;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

pub use error::CallError;
pub use http::HttpBatchClient;

/// Outcome of one call slot.
pub type CallOutcome = std::result::Result<CallResponse, CallError>;

/// HTTP method of a call descriptor.
///
/// Destination inventories are read with GET and written with PUT; nothing
/// else is part of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One call descriptor submitted to a [`BatchClient`].
#[derive(Debug, Clone)]
pub struct CallRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// JSON body for write calls.
    pub json: Option<serde_json::Value>,
    /// Per-call timeout override; the client default applies when unset.
    pub timeout: Option<Duration>,
}

impl CallRequest {
    /// Build a GET descriptor.
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), json: None, timeout: None }
    }

    /// Build a PUT descriptor with a JSON body.
    pub fn put(url: impl Into<String>, json: serde_json::Value) -> Self {
        Self { method: Method::Put, url: url.into(), json: Some(json), timeout: None }
    }

    /// Override the timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Response half of a completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body; `Null` for empty bodies.
    pub body: serde_json::Value,
}

impl CallResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Paired request/response record for one submitted call.
#[derive(Debug, Clone)]
pub struct Call {
    /// The descriptor as submitted.
    pub request: CallRequest,
    /// The response, or the failure of this one slot.
    pub outcome: CallOutcome,
}

impl Call {
    /// The response, if the call completed.
    pub fn response(&self) -> Option<&CallResponse> {
        self.outcome.as_ref().ok()
    }
}

impl fmt::Display for Call {
    /// Compact `status method url` form used in log output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(response) => {
                write!(f, "{} {} {}", response.status, self.request.method, self.request.url)
            }
            Err(_) => write!(f, "ERR {} {}", self.request.method, self.request.url),
        }
    }
}

/// Batched call execution facility.
///
/// # Contract
///
/// - Every descriptor is executed concurrently.
/// - `submit` returns only after all calls completed.
/// - The returned records are in submission order, one per descriptor.
/// - A transport failure fails only its own slot; the other slots of the
///   batch are unaffected.
#[async_trait]
pub trait BatchClient: Send + Sync {
    /// Execute all descriptors and return their call records.
    async fn submit(&self, requests: Vec<CallRequest>) -> Vec<Call>;
}
