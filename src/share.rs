//! Share text and share links for the content on screen.

use crate::error::{AppError, Result};
use crate::session::Session;
use daily_api::DailyClient;
use url::Url;

/// Shown instead of a share message when nothing has loaded yet.
pub const EMPTY_SHARE_MESSAGE: &str = "오늘의 한 줄을 확인해보세요!";

/// Plain-text message describing the quote, colour, and drink on screen.
pub fn share_message(session: &Session, page_url: &str) -> String {
    let Some(quote) = &session.current_quote else {
        return EMPTY_SHARE_MESSAGE.to_owned();
    };

    let mut message = String::from("🌟 오늘, 나에게 들려주는 한 줄\n\n");
    message.push_str(&format!("\"{}\"\n", quote.text));
    if let Some(author) = quote.author.as_deref().filter(|a| !a.is_empty()) {
        message.push_str(&format!("- {author}\n"));
    }
    message.push('\n');

    if let Some(color) = &session.current_color {
        message.push_str(&format!("🎨 오늘의 컬러: {} {}\n", color.name, color.hex));
        if let Some(meaning) = color.meaning.as_deref().filter(|m| !m.is_empty()) {
            message.push_str(&format!("{meaning}\n\n"));
        }
    }

    if let Some(drink) = &session.current_drink {
        let emoji = drink.emoji.as_deref().unwrap_or("☕");
        message.push_str(&format!("☕ 오늘의 한잔: {emoji} {}\n", drink.name));
        if let Some(description) = drink.description.as_deref().filter(|d| !d.is_empty()) {
            message.push_str(&format!("{description}\n\n"));
        }
    }

    message.push('\n');
    message.push_str(page_url);
    message
}

/// Link to `page_url` that carries the content on screen as query parameters.
///
/// Any query or fragment already on `page_url` is replaced.
///
/// # Errors
///
/// Returns [`AppError::Config`] if `page_url` is not an absolute URL.
pub fn share_url(session: &Session, page_url: &str) -> Result<String> {
    let mut url = Url::parse(page_url)
        .map_err(|e| AppError::Config(format!("invalid page url '{page_url}': {e}")))?;
    url.set_query(None);
    url.set_fragment(None);

    let mut params: Vec<(&str, &str)> = Vec::new();
    if let Some(birth_date) = &session.birth_date {
        params.push(("birth_date", birth_date.as_str()));
    }
    if let Some(quote) = &session.current_quote {
        params.push(("quote_text", quote.text.as_str()));
        params.push(("quote_author", quote.author.as_deref().unwrap_or_default()));
        params.push(("quote_type", quote.kind.as_deref().unwrap_or("quote")));
    }
    if let Some(color) = &session.current_color {
        params.push(("color_name", color.name.as_str()));
        params.push(("color_hex", color.hex.as_str()));
    }
    if let Some(drink) = &session.current_drink {
        params.push(("drink_name", drink.name.as_str()));
        params.push(("drink_emoji", drink.emoji.as_deref().unwrap_or_default()));
    }

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url.into())
}

/// Shorten `long_url` through the backend, falling back to `long_url` on any failure.
pub async fn resolve_share_link(client: &DailyClient, long_url: &str) -> String {
    match client.shorten_url(long_url).await {
        Ok(short) => {
            tracing::debug!(%short, "share link shortened");
            short
        }
        Err(e) => {
            tracing::warn!(error = %e, "url shortening failed, sharing the long link");
            long_url.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use daily_api::{Color, Drink, Quote};

    fn loaded_session() -> Session {
        let mut session = Session::new("user_1");
        session.birth_date = Some("1990-05-17".into());
        session.current_quote = Some(Quote {
            text: "천천히 가도 괜찮아".into(),
            author: Some("익명".into()),
            source: None,
            kind: Some("poem".into()),
        });
        session.current_color = Some(Color {
            hex: "#3366CC".into(),
            name: "코발트 블루".into(),
            meaning: Some("차분한 집중의 색입니다.".into()),
            rgb: None,
        });
        session.current_drink = Some(Drink {
            name: "얼그레이".into(),
            emoji: Some("🍵".into()),
            kind: Some("tea".into()),
            type_korean: Some("차".into()),
            description: Some("향긋한 홍차.".into()),
        });
        session
    }

    #[test]
    fn empty_session_has_placeholder_message() {
        let session = Session::new("user_1");
        assert_eq!(share_message(&session, "https://x"), EMPTY_SHARE_MESSAGE);
    }

    #[test]
    fn message_lists_everything_on_screen() {
        let msg = share_message(&loaded_session(), "https://line.example/");
        assert!(msg.starts_with("🌟 오늘, 나에게 들려주는 한 줄\n\n\"천천히 가도 괜찮아\"\n- 익명\n\n"));
        assert!(msg.contains("🎨 오늘의 컬러: 코발트 블루 #3366CC\n차분한 집중의 색입니다.\n\n"));
        assert!(msg.contains("☕ 오늘의 한잔: 🍵 얼그레이\n향긋한 홍차.\n\n"));
        assert!(msg.ends_with("\nhttps://line.example/"));
    }

    #[test]
    fn message_without_author_skips_author_line() {
        let mut session = loaded_session();
        session.current_quote.as_mut().unwrap().author = None;
        session.current_color = None;
        session.current_drink = None;
        let msg = share_message(&session, "https://x/");
        assert_eq!(
            msg,
            "🌟 오늘, 나에게 들려주는 한 줄\n\n\"천천히 가도 괜찮아\"\n\n\nhttps://x/"
        );
    }

    #[test]
    fn share_url_carries_content() {
        let url = share_url(&loaded_session(), "https://line.example/app?old=1#top").unwrap();
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/app");
        assert!(parsed.fragment().is_none());

        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        let get = |k: &str| pairs.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("old"), None);
        assert_eq!(get("birth_date"), Some("1990-05-17"));
        assert_eq!(get("quote_text"), Some("천천히 가도 괜찮아"));
        assert_eq!(get("quote_author"), Some("익명"));
        assert_eq!(get("quote_type"), Some("poem"));
        assert_eq!(get("color_name"), Some("코발트 블루"));
        assert_eq!(get("color_hex"), Some("#3366CC"));
        assert_eq!(get("drink_name"), Some("얼그레이"));
        assert_eq!(get("drink_emoji"), Some("🍵"));
    }

    #[test]
    fn share_url_escapes_hash_in_hex() {
        let url = share_url(&loaded_session(), "https://line.example/").unwrap();
        assert!(url.contains("color_hex=%233366CC"), "{url}");
    }

    #[test]
    fn share_url_without_content_is_bare_page() {
        let session = Session::new("user_1");
        assert_eq!(
            share_url(&session, "https://line.example/").unwrap(),
            "https://line.example/"
        );
    }

    #[test]
    fn share_url_rejects_relative_page() {
        assert!(share_url(&loaded_session(), "/relative").is_err());
    }
}
