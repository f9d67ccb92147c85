/// Unified error handling module
use std::fmt;
use thiserror::Error;

/// Hint shown next to connectivity-flavoured failures
pub const NETWORK_HINT: &str =
    "This could be due to network connectivity issues or the SpaceX API being temporarily unavailable.";

/// Transport-level failure classes, decided where the error is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    Timeout,
    Connect,
    Transport,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkKind::Timeout => write!(f, "request timed out"),
            NetworkKind::Connect => write!(f, "connection failed"),
            NetworkKind::Transport => write!(f, "transport error"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error ({kind}) - please check your connection and try again: {message}")]
    Network { kind: NetworkKind, message: String },
    #[error("HTTP error! status: {status} ({url})")]
    HttpStatus { status: u16, url: String },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Request superseded")]
    Cancelled,
}

impl ApiError {
    pub fn network(kind: NetworkKind, message: impl Into<String>) -> Self {
        ApiError::Network {
            kind,
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    /// Canonical retry rule shared by every fetch path.
    ///
    /// Transport failures of any kind are retried, as are statuses that
    /// signal a transient upstream condition (408, 429, 5xx).
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network { .. } => true,
            ApiError::HttpStatus { status, .. } => {
                matches!(status, 408 | 429) || (500..=599).contains(status)
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ApiError::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        let kind = if err.is_timeout() {
            NetworkKind::Timeout
        } else if err.is_connect() {
            NetworkKind::Connect
        } else {
            NetworkKind::Transport
        };
        ApiError::network(kind, err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

/// What the error display shows in place of the list or detail content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message: String,
    pub hint: Option<&'static str>,
    pub can_retry: bool,
}

impl From<&ApiError> for ErrorNotice {
    fn from(err: &ApiError) -> Self {
        ErrorNotice {
            message: err.to_string(),
            hint: err.is_network().then_some(NETWORK_HINT),
            can_retry: !matches!(err, ApiError::Cancelled | ApiError::Config(_)),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
