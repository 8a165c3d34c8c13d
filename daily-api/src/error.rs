//! Error types for the daily-api crate.
//!
//! Messages are stable strings suitable for display to users. User
//! identifiers never appear in error messages.

/// Errors that can occur while talking to the daily-line backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The response body was not the expected JSON envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// The backend answered with `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns `true` for transport and decoding failures, as opposed to a
    /// domain-level rejection reported by the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout(_) | Self::Parse(_))
    }

    pub(crate) fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{context}: {err}"))
        } else if err.is_decode() {
            Self::Parse(format!("{context}: {err}"))
        } else {
            Self::Http(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for daily-api results.
pub type Result<T> = std::result::Result<T, ApiError>;
