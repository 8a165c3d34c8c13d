//! Shared HTTP client construction.
//!
//! Provides a configured [`reqwest::Client`] with the request timeout and
//! User-Agent taken from [`ApiConfig`].

use crate::config::ApiConfig;
use crate::error::ApiError;
use std::time::Duration;

/// User-Agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("daily-api/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for talking to the backend.
///
/// # Errors
///
/// Returns [`ApiError::Http`] if the client cannot be constructed.
pub fn build_client(config: &ApiConfig) -> Result<reqwest::Client, ApiError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| ApiError::Http(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_user_agent_names_crate() {
        assert!(DEFAULT_USER_AGENT.starts_with("daily-api/"));
    }

    #[test]
    fn build_client_with_default_config() {
        let config = ApiConfig::default();
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = ApiConfig {
            user_agent: Some("CustomClient/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }
}
