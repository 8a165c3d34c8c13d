//! Error types for the daily-line client.

/// Top-level error type for the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Backend request failed.
    #[error(transparent)]
    Api(#[from] daily_api::ApiError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Persisted identity could not be read or written.
    #[error("identity error: {0}")]
    Identity(String),

    /// Birth date entered by the user is not `YYYY-MM-DD`.
    #[error("invalid birth date: {0}")]
    InvalidBirthDate(String),

    /// Clipboard copy failed on every route.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
