//! Backend client for the birthday, daily, quote and shorten-url endpoints.
//!
//! Every endpoint answers with a JSON [`Envelope`], also on 4xx/5xx, so the
//! body is decoded regardless of HTTP status and `success: false` is mapped
//! to [`ApiError::Rejected`].

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::http;
use crate::types::{
    BirthdayData, DailyContent, DailyOutcome, Envelope, RandomContent, SaveBirthdayRequest,
    ShortUrlData, ShortenRequest,
};
use serde::de::DeserializeOwned;
use url::Url;

/// Fallback message when saving a birth date fails without an explanation.
pub const SAVE_FAILED_MESSAGE: &str = "저장에 실패했습니다.";

/// Fallback message when no quote can be loaded.
pub const QUOTE_UNAVAILABLE_MESSAGE: &str = "명언을 불러올 수 없습니다.";

/// Fallback message when the backend wants a birth date first.
pub const BIRTHDAY_REQUIRED_MESSAGE: &str = "생년월일을 먼저 입력해주세요.";

/// Typed client for the daily-line backend.
#[derive(Debug, Clone)]
pub struct DailyClient {
    http: reqwest::Client,
    base: Url,
}

impl DailyClient {
    /// Create a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for an invalid config and
    /// [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            http: http::build_client(config)?,
            base: config.parsed_base_url()?,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /api/birthday/{user_id}`.
    ///
    /// Returns `Ok(None)` when the backend has no birth date stored (it
    /// answers 404 with `success: false`).
    pub async fn get_birthday(&self, user_id: &str) -> Result<Option<String>> {
        let url = self.endpoint(&["api", "birthday", user_id])?;
        tracing::debug!("fetching stored birth date");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest("birthday request failed", e))?;
        let envelope: Envelope<BirthdayData> = read_envelope(response).await?;

        if !envelope.success {
            return Ok(None);
        }
        Ok(envelope
            .data
            .and_then(|d| d.birth_date)
            .filter(|d| !d.trim().is_empty()))
    }

    /// `POST /api/birthday`.
    pub async fn save_birthday(&self, user_id: &str, birth_date: &str) -> Result<()> {
        let url = self.endpoint(&["api", "birthday"])?;
        tracing::debug!(birth_date, "saving birth date");

        let response = self
            .http
            .post(url)
            .json(&SaveBirthdayRequest {
                user_id,
                birth_date,
            })
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest("save birthday request failed", e))?;
        let envelope: Envelope<serde_json::Value> = read_envelope(response).await?;

        if envelope.success {
            Ok(())
        } else {
            Err(ApiError::Rejected(
                envelope.error.unwrap_or_else(|| SAVE_FAILED_MESSAGE.to_owned()),
            ))
        }
    }

    /// `GET /api/daily?user_id=`.
    pub async fn fetch_daily(&self, user_id: &str) -> Result<DailyOutcome> {
        let mut url = self.endpoint(&["api", "daily"])?;
        url.query_pairs_mut().append_pair("user_id", user_id);
        tracing::debug!("fetching daily content");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest("daily request failed", e))?;
        let envelope: Envelope<DailyContent> = read_envelope(response).await?;

        if envelope.success {
            return envelope
                .data
                .map(DailyOutcome::Ready)
                .ok_or_else(|| ApiError::Parse("daily response has no data".into()));
        }
        if envelope.requires_birthday {
            return Ok(DailyOutcome::RequiresBirthday(
                envelope
                    .error
                    .unwrap_or_else(|| BIRTHDAY_REQUIRED_MESSAGE.to_owned()),
            ));
        }
        Err(ApiError::Rejected(
            envelope
                .error
                .unwrap_or_else(|| QUOTE_UNAVAILABLE_MESSAGE.to_owned()),
        ))
    }

    /// `GET /api/quote?user_id=&random=`: a different quote than the daily one.
    pub async fn fetch_random(&self, user_id: &str, seed: &str) -> Result<RandomContent> {
        let mut url = self.endpoint(&["api", "quote"])?;
        url.query_pairs_mut()
            .append_pair("user_id", user_id)
            .append_pair("random", seed);
        tracing::debug!(seed, "fetching random quote");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest("quote request failed", e))?;
        let envelope: Envelope<RandomContent> = read_envelope(response).await?;

        match (envelope.success, envelope.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ApiError::Parse("quote response has no data".into())),
            (false, _) => Err(ApiError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| QUOTE_UNAVAILABLE_MESSAGE.to_owned()),
            )),
        }
    }

    /// `POST /api/shorten-url`.
    pub async fn shorten_url(&self, long_url: &str) -> Result<String> {
        let url = self.endpoint(&["api", "shorten-url"])?;

        let response = self
            .http
            .post(url)
            .json(&ShortenRequest { url: long_url })
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest("shorten request failed", e))?;
        let envelope: Envelope<ShortUrlData> = read_envelope(response).await?;

        let short = envelope
            .data
            .and_then(|d| d.short_url)
            .filter(|s| !s.is_empty());
        match (envelope.success, short) {
            (true, Some(short)) => Ok(short),
            _ => Err(ApiError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "short URL unavailable".to_owned()),
            )),
        }
    }

    /// Resolve `segments` below the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Config("base_url cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<Envelope<T>> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::from_reqwest("response read failed", e))?;

    tracing::trace!(status = status.as_u16(), bytes = body.len(), "response received");

    serde_json::from_str(&body)
        .map_err(|e| ApiError::Parse(format!("unexpected response (HTTP {status}): {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn client_for(base: &str) -> DailyClient {
        DailyClient::new(&ApiConfig {
            base_url: base.into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_appends_segments_to_root() {
        let client = client_for("http://localhost:5000");
        let url = client.endpoint(&["api", "daily"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/daily");
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let client = client_for("https://example.com/line/");
        let url = client.endpoint(&["api", "quote"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/line/api/quote");
    }

    #[test]
    fn endpoint_encodes_user_id_segment() {
        let client = client_for("http://localhost:5000");
        let url = client.endpoint(&["api", "birthday", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/birthday/a%2Fb%20c");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = DailyClient::new(&ApiConfig {
            timeout_seconds: 0,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
