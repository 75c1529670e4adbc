// Error types for chmctl

use crate::protocol::ServiceAction;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using anyhow::Error
pub type Result<T> = anyhow::Result<T>;

/// Result type for calls made through the API client
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Consumer-level errors (configuration, CLI)
#[derive(Error, Debug)]
pub enum ChmError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid host identifier: {0:?}")]
    InvalidHost(String),

    #[error("Unknown managed service '{0}'")]
    UnknownService(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received (connection refused, DNS, reset)
    Transport,
    /// No response within the configured timeout
    Timeout,
    /// A response with a non-2xx status
    Http,
    /// A 2xx response whose body did not match the expected shape
    Decode,
    /// The caller cancelled the request
    Cancelled,
    /// The request was rejected before it was sent
    Invalid,
}

/// Errors surfaced by the API client.
///
/// The client never retries or recovers on its own; every failure reaches the
/// caller as one of these variants.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Transport error calling {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        message: String,
        url: String,
        /// Parsed response body, when the server sent JSON
        body: Option<serde_json::Value>,
    },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Action '{action}' is not supported by {service}")]
    UnsupportedAction {
        service: &'static str,
        action: ServiceAction,
    },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout { .. } => ErrorKind::Timeout,
            ApiError::Transport { .. } => ErrorKind::Transport,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Decode { .. } => ErrorKind::Decode,
            ApiError::Cancelled => ErrorKind::Cancelled,
            ApiError::InvalidRequest(_) | ApiError::UnsupportedAction { .. } => ErrorKind::Invalid,
        }
    }

    /// HTTP status of the response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// True for authentication (401) or authorization (403) failures
    pub fn is_auth(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}
