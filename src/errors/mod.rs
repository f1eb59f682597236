//! # Error Handling
//!
//! This module provides error handling for the certplane certificate
//! lifecycle crate. It defines custom error types using `thiserror` for the
//! certificate store and the destination reconciliation engine.

use crate::client::CallError;

/// Custom result type for certplane operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for certificate store and reconciliation operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        context: String,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Certificate not present in the store
    #[error("Certificate not found: '{common_name}'")]
    NotFound { common_name: String },

    /// Malformed or unreadable certificate archive blob
    #[error("Archive error for '{name}': {reason}")]
    Archive { name: String, reason: String },

    /// Archive reference outside the store layout
    #[error("Cannot decompose archive path '{path}': expected <root>/<name>.tar.gz")]
    Decompose { path: String },

    /// Destination unreachable during the connectivity probe
    #[error("Destination '{destination}' is unreachable")]
    Connectivity {
        destination: String,
        #[source]
        source: CallError,
    },

    /// Destination inventory listing rejected
    #[error("Inventory listing failed on '{destination}': {method} {url} returned status {status}")]
    InventoryList {
        destination: String,
        method: String,
        url: String,
        status: u16,
    },

    /// Transport failures outside the connectivity probe
    #[error("Request to destination '{destination}' failed")]
    Transport {
        destination: String,
        #[source]
        source: CallError,
    },

    /// Operations outside a destination family's scope
    #[error("Operation '{operation}' is not supported by the '{family}' destination family")]
    Unsupported { family: String, operation: String },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(common_name: S) -> Self {
        Self::NotFound {
            common_name: common_name.into(),
        }
    }

    /// Create an archive error
    pub fn archive<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::Archive {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a decompose error
    pub fn decompose<S: Into<String>>(path: S) -> Self {
        Self::Decompose { path: path.into() }
    }

    /// Create a connectivity error
    pub fn connectivity<S: Into<String>>(destination: S, source: CallError) -> Self {
        Self::Connectivity {
            destination: destination.into(),
            source,
        }
    }

    /// Create an inventory listing error
    pub fn inventory_list<D, M, U>(destination: D, method: M, url: U, status: u16) -> Self
    where
        D: Into<String>,
        M: Into<String>,
        U: Into<String>,
    {
        Self::InventoryList {
            destination: destination.into(),
            method: method.into(),
            url: url.into(),
            status,
        }
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(destination: S, source: CallError) -> Self {
        Self::Transport {
            destination: destination.into(),
            source,
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported<F: Into<String>, O: Into<String>>(family: F, operation: O) -> Self {
        Self::Unsupported {
            family: family.into(),
            operation: operation.into(),
        }
    }

    /// Check if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Io { .. } | Error::Connectivity { .. } | Error::Transport { .. }
        )
    }
}

// Error conversions for common external error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            source: error,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            source: Box::new(error),
            context: "JSON serialization failed".to_string(),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Serialization {
            source: Box::new(error),
            context: "YAML serialization failed".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}
