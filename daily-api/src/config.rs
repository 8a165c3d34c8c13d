//! Client configuration with sensible defaults.
//!
//! [`ApiConfig`] controls which backend is contacted and how long a single
//! request may take. It is embedded as the `[api]` table of the application
//! config file.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the backend HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, `daily-api/<version>` is sent.
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_owned(),
            timeout_seconds: 10,
            user_agent: None,
        }
    }
}

impl ApiConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `base_url` must be an absolute `http` or `https` URL
    /// - `timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), ApiError> {
        self.parsed_base_url()?;
        if self.timeout_seconds == 0 {
            return Err(ApiError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parses `base_url`, rejecting non-HTTP schemes and URLs that cannot
    /// carry path segments.
    pub fn parsed_base_url(&self) -> Result<Url, ApiError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base_url '{}': {e}", self.base_url)))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ApiError::Config(format!(
                    "base_url scheme must be http or https, got '{other}'"
                )));
            }
        }
        if url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "base_url '{}' cannot be used as a base",
                self.base_url
            )));
        }
        Ok(url)
    }
}
