//! Integration tests for [`DailyClient`] against a mock HTTP server.
//!
//! Each test mounts the backend's JSON envelope for one endpoint and checks
//! how the client maps it onto its typed results.

use daily_api::{ApiConfig, ApiError, DailyClient, DailyOutcome};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> DailyClient {
    DailyClient::new(&ApiConfig {
        base_url: server.uri(),
        timeout_seconds: 2,
        user_agent: None,
    })
    .expect("client")
}

#[tokio::test]
async fn daily_ready_payload_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/daily"))
        .and(query_param("user_id", "user_42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "quote": {"text": "오늘도 한 걸음", "author": "누군가", "type": "quote"},
                "color": {"name": "바다색", "hex": "#4682B4", "rgb": [70, 130, 180]},
                "shopping_items": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_daily("user_42").await.expect("ok");
    let DailyOutcome::Ready(content) = outcome else {
        panic!("expected ready content, got {outcome:?}");
    };
    assert_eq!(content.quote.text, "오늘도 한 걸음");
    assert_eq!(content.color.expect("color").hex, "#4682B4");
    assert!(content.drink.is_none());
}

#[tokio::test]
async fn malformed_colour_and_drink_still_load_quote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/daily"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "quote": {"text": "그래도 오늘"},
                "color": {"name": null, "rgb": [300, 1, 2]},
                "drink": {"name": null}
            }
        })))
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_daily("user_1").await.expect("ok");
    let DailyOutcome::Ready(content) = outcome else {
        panic!("expected ready content, got {outcome:?}");
    };
    assert_eq!(content.quote.text, "그래도 오늘");
    let color = content.color.expect("color");
    assert!(color.hex.is_empty());
    assert_eq!(color.rgb, None);
    assert!(content.drink.expect("drink").name.is_empty());
}

#[tokio::test]
async fn daily_requires_birthday_on_400_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/daily"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "생년월일을 먼저 입력해주세요.",
            "requires_birthday": true
        })))
        .mount(&server)
        .await;

    let outcome = client(&server).fetch_daily("user_1").await.expect("ok");
    assert_eq!(
        outcome,
        DailyOutcome::RequiresBirthday("생년월일을 먼저 입력해주세요.".into())
    );
}

#[tokio::test]
async fn daily_failure_without_flag_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/daily"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "서버 오류가 발생했습니다: boom"
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_daily("user_1").await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m.contains("boom")));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn daily_failure_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/daily"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let err = client(&server).fetch_daily("user_1").await.unwrap_err();
    assert_eq!(err.to_string(), daily_api::client::QUOTE_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn non_json_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/daily"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_daily("user_1").await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)), "got {err:?}");
    assert!(err.is_transport());
}

#[tokio::test]
async fn birthday_lookup_returns_stored_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/birthday/user_7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"birth_date": "1990-05-17"}
        })))
        .mount(&server)
        .await;

    let date = client(&server).get_birthday("user_7").await.expect("ok");
    assert_eq!(date.as_deref(), Some("1990-05-17"));
}

#[tokio::test]
async fn birthday_lookup_404_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/birthday/user_new"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": "저장된 생년월일이 없습니다."
        })))
        .mount(&server)
        .await;

    let date = client(&server).get_birthday("user_new").await.expect("ok");
    assert!(date.is_none());
}

#[tokio::test]
async fn save_birthday_posts_wire_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/birthday"))
        .and(body_json(json!({"user_id": "user_7", "birth_date": "1990-05-17"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "생년월일이 저장되었습니다."
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .save_birthday("user_7", "1990-05-17")
        .await
        .expect("saved");
}

#[tokio::test]
async fn save_birthday_rejection_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/birthday"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "생년월일 형식이 올바르지 않습니다. (YYYY-MM-DD)"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .save_birthday("user_7", "17/05/1990")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("YYYY-MM-DD"));
}

#[tokio::test]
async fn random_quote_sends_seed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/quote"))
        .and(query_param("user_id", "user_7"))
        .and(query_param("random", "1709337600000.42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"quote": {"text": "다른 한 줄"}, "analysis": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let content = client(&server)
        .fetch_random("user_7", "1709337600000.42")
        .await
        .expect("ok");
    assert_eq!(content.quote.text, "다른 한 줄");
    assert!(content.color.is_none());
}

#[tokio::test]
async fn shorten_url_returns_short_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/shorten-url"))
        .and(body_json(json!({"url": "https://line.example/?birth_date=1990-05-17"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"short_url": "https://line.example/s/abc123", "code": "abc123"}
        })))
        .mount(&server)
        .await;

    let short = client(&server)
        .shorten_url("https://line.example/?birth_date=1990-05-17")
        .await
        .expect("ok");
    assert_eq!(short, "https://line.example/s/abc123");
}

#[tokio::test]
async fn shorten_url_without_link_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/shorten-url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {}
        })))
        .mount(&server)
        .await;

    let err = client(&server).shorten_url("https://x").await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/daily"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({"success": true, "data": {"quote": {"text": "late"}}})),
        )
        .mount(&server)
        .await;

    let client = DailyClient::new(&ApiConfig {
        base_url: server.uri(),
        timeout_seconds: 1,
        user_agent: None,
    })
    .expect("client");

    let err = client.fetch_daily("user_1").await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_http_error() {
    let client = DailyClient::new(&ApiConfig {
        base_url: "http://127.0.0.1:9".into(),
        timeout_seconds: 2,
        user_agent: None,
    })
    .expect("client");

    let err = client.fetch_daily("user_1").await.unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
}
