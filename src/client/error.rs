//! Error types for batched destination calls.

use thiserror::Error;

/// Failure of one call slot in a batch.
///
/// Carried inside the call record so one failed slot never poisons the
/// surviving slots of the same batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The call did not complete within its timeout.
    #[error("Request timed out after {timeout_ms}ms: {method} {url}")]
    Timeout { method: String, url: String, timeout_ms: u64 },

    /// TCP or TLS connection establishment failed.
    #[error("Connection failed: {method} {url}: {message}")]
    Connect { method: String, url: String, message: String },

    /// The request failed after the connection was established.
    #[error("Request failed: {method} {url}: {message}")]
    Request { method: String, url: String, message: String },

    /// The response body could not be read or decoded.
    #[error("Invalid response body: {method} {url}: {message}")]
    Body { method: String, url: String, message: String },
}

impl CallError {
    /// Create a timeout error.
    pub fn timeout(method: impl Into<String>, url: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout { method: method.into(), url: url.into(), timeout_ms }
    }

    /// Create a connection error.
    pub fn connect(
        method: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Connect { method: method.into(), url: url.into(), message: message.into() }
    }

    /// Create a request error.
    pub fn request(
        method: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Request { method: method.into(), url: url.into(), message: message.into() }
    }

    /// Create a response body error.
    pub fn body(
        method: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Body { method: method.into(), url: url.into(), message: message.into() }
    }

    /// Whether the call timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether connection establishment failed.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    /// Whether the destination could not be reached at all.
    ///
    /// Distinguishes reachability failures, which the connectivity probe
    /// translates, from failures of an established exchange, which always
    /// propagate unchanged.
    pub fn is_unreachable(&self) -> bool {
        self.is_timeout() || self.is_connect()
    }
}
