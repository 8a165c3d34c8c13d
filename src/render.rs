//! Terminal rendering of the day's content.

use crate::clipboard::CopyOutcome;
use crate::scheduler::DayKey;
use crate::session::Session;
use crate::theme::{ThemeVars, hex_to_rgb};
use chrono::{Datelike, NaiveDate};
use daily_api::{Color, Drink, Flower, ShoppingItem};
use std::fmt::Write as _;

/// Subtitle shown when no birth date is known.
pub const DEFAULT_SUBTITLE: &str = "생년월일에 맞춘 매일 다른 명언 또는 시를 제공합니다";

const BANNER_WIDTH: usize = 48;
const RESET: &str = "\x1b[0m";

/// Quote body as trimmed, non-blank lines.
pub fn quote_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// `- author -`, or `None` without an author.
pub fn author_line(author: Option<&str>) -> Option<String> {
    author
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| format!("- {a} -"))
}

/// Header subtitle for the stored birth date.
pub fn subtitle(birth_date: Option<&str>) -> String {
    let Some(date) = birth_date.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    else {
        return DEFAULT_SUBTITLE.to_owned();
    };
    format!(
        "{:02}년 {}월 {}일생을 위한 오늘의 메시지\n당신에게 오늘 필요한 한 줄이에요",
        date.year().rem_euclid(100),
        date.month(),
        date.day()
    )
}

/// Split a colour meaning into a short first sentence and the rest.
///
/// Sentences end at `.` or `。`. The short description reads as a full
/// sentence, so `입니다` is appended unless it is already there.
pub fn split_color_meaning(meaning: &str) -> (String, String) {
    let sentences: Vec<&str> = meaning
        .split(['.', '。'])
        .filter(|s| !s.trim().is_empty())
        .collect();

    let mut short = match sentences.first() {
        Some(first) => first.trim().to_owned(),
        None => meaning.to_owned(),
    };
    let long = sentences
        .get(1..)
        .map(|rest| rest.join(". ").trim().to_owned())
        .unwrap_or_default();

    if !short.is_empty() && !short.ends_with("입니다") && !short.ends_with('.') {
        short.push_str("입니다");
    }
    (short, long)
}

/// Split a drink description into its first sentence and the rest.
pub fn split_drink_description(description: &str) -> (String, String) {
    let parts: Vec<&str> = description
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let short = parts.first().map(|s| (*s).to_owned()).unwrap_or_default();
    let long = parts.get(1..).map(|rest| rest.join(". ")).unwrap_or_default();
    (short, long)
}

/// Format a price as won with thousands separators, e.g. `12,900원`.
///
/// Only the leading integer is used. Missing, unparsable, and zero prices
/// render as `None`.
pub fn format_price(price: &str) -> Option<String> {
    let trimmed = price.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: u64 = digits[..end].parse().ok()?;
    if value == 0 {
        return None;
    }
    Some(format!(
        "{}{}원",
        if negative { "-" } else { "" },
        group_thousands(value)
    ))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn ansi_bg(rgb: [u8; 3]) -> String {
    format!("\x1b[48;2;{};{};{}m", rgb[0], rgb[1], rgb[2])
}

/// A strip of `width` cells fading from the first theme stop to the second.
pub fn gradient_banner(theme: &ThemeVars, width: usize) -> String {
    let [a, b] = [theme.gradient.start, theme.gradient.end];
    let mut out = String::new();
    for i in 0..width {
        let t = if width > 1 {
            i as f64 / (width - 1) as f64
        } else {
            0.0
        };
        let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
        out.push_str(&ansi_bg([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]));
        out.push(' ');
    }
    out.push_str(RESET);
    out
}

fn swatch(hex: &str) -> String {
    match hex_to_rgb(hex) {
        Some(rgb) => format!("{}    {RESET}", ansi_bg(rgb)),
        None => String::new(),
    }
}

fn color_card(out: &mut String, color: &Color) {
    let (short, long) = split_color_meaning(color.meaning.as_deref().unwrap_or_default());
    let _ = writeln!(out, "🎨 오늘의 컬러  {} {} {}", swatch(&color.hex), color.name, color.hex);
    if !short.is_empty() {
        let _ = writeln!(out, "   {short}");
    }
    if !long.is_empty() {
        let _ = writeln!(out, "   {long}");
    }
}

fn drink_card(out: &mut String, drink: &Drink) {
    let (short, long) = split_drink_description(drink.description.as_deref().unwrap_or_default());
    let emoji = drink.emoji.as_deref().unwrap_or("☕");
    let _ = write!(out, "{emoji} 오늘의 한잔  {}", drink.name);
    match drink.type_korean.as_deref().filter(|t| !t.is_empty()) {
        Some(kind) => {
            let _ = writeln!(out, " ({kind})");
        }
        None => out.push('\n'),
    }
    if !short.is_empty() {
        let _ = writeln!(out, "   {short}");
    }
    if !long.is_empty() {
        let _ = writeln!(out, "   {long}");
    }
}

fn flower_card(out: &mut String, flower: &Flower) {
    let emoji = flower.emoji.as_deref().unwrap_or("🌺");
    let _ = writeln!(
        out,
        "{emoji} 오늘의 꽃  {}",
        flower.name.as_deref().unwrap_or_default()
    );
    if let Some(source) = flower.source.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "   {source}");
    }
    if let Some(meaning) = flower.meaning.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "   {meaning}");
    }
}

fn shopping_card(out: &mut String, item: &ShoppingItem) {
    let _ = writeln!(
        out,
        "🛍️ 추천 아이템  {}",
        item.name.as_deref().unwrap_or_default()
    );
    if let Some(price) = item.price.as_deref().and_then(format_price) {
        let _ = writeln!(out, "   {price}");
    }
    if let Some(mall) = item.mall_name.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "   {mall}");
    }
    if let Some(link) = item.link.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "   {link}");
    }
}

/// Everything on screen for `session`, dated `today`.
pub fn render_session(session: &Session, today: DayKey) -> String {
    let mut out = String::new();
    let theme = session.theme.current();

    if let Some(theme) = theme {
        let _ = writeln!(out, "{}", gradient_banner(theme, BANNER_WIDTH));
    }
    let _ = writeln!(out, "{}\n", subtitle(session.birth_date.as_deref()));

    if let Some(quote) = &session.current_quote {
        for line in quote_lines(&quote.text) {
            let _ = writeln!(out, "  {line}");
        }
        if let Some(author) = author_line(quote.author.as_deref()) {
            let _ = writeln!(out, "\n  {author}");
        }
        let _ = writeln!(out, "{:>width$}\n", today.to_string(), width = BANNER_WIDTH);
    }

    if let Some(color) = &session.current_color {
        color_card(&mut out, color);
        out.push('\n');
    }
    if let Some(drink) = &session.current_drink {
        drink_card(&mut out, drink);
        out.push('\n');
    }
    if let Some(flower) = &session.current_flower {
        flower_card(&mut out, flower);
        out.push('\n');
    }
    if let Some(item) = session.shopping_items.first() {
        shopping_card(&mut out, item);
        out.push('\n');
    }

    if let Some(theme) = theme {
        let _ = writeln!(out, "{}", gradient_banner(theme, BANNER_WIDTH));
    }
    out
}

/// Notice shown after trying to copy a share link.
pub fn copy_notice(outcome: &CopyOutcome) -> String {
    match outcome {
        CopyOutcome::Copied | CopyOutcome::CopiedLegacy => "URL이 복사되었습니다.".to_owned(),
        CopyOutcome::Manual(url) => {
            format!("URL 복사에 실패했습니다. 아래 URL을 직접 복사해주세요:\n\n{url}")
        }
    }
}

/// Description of a derived theme, for the `theme` subcommand.
pub fn render_theme(vars: &ThemeVars) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", gradient_banner(vars, BANNER_WIDTH));
    let _ = writeln!(
        out,
        "{} {} brightness {:.1} ({})",
        swatch(&vars.color),
        vars.color,
        vars.gradient.brightness,
        vars.gradient.lightness
    );
    out.push_str(&vars.to_css());
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use daily_api::Quote;

    #[test]
    fn poem_lines_are_trimmed_and_blank_lines_dropped() {
        let lines = quote_lines("  첫 줄  \n\n   \n둘째 줄\r\n셋째 줄");
        assert_eq!(lines, ["첫 줄", "둘째 줄", "셋째 줄"]);
    }

    #[test]
    fn author_is_wrapped_in_dashes() {
        assert_eq!(author_line(Some("윤동주")).as_deref(), Some("- 윤동주 -"));
        assert_eq!(author_line(Some("  ")), None);
        assert_eq!(author_line(None), None);
    }

    #[test]
    fn subtitle_uses_two_digit_year() {
        assert_eq!(
            subtitle(Some("1990-05-07")),
            "90년 5월 7일생을 위한 오늘의 메시지\n당신에게 오늘 필요한 한 줄이에요"
        );
        assert!(subtitle(Some("2005-12-31")).starts_with("05년 12월 31일생"));
    }

    #[test]
    fn subtitle_defaults_without_valid_date() {
        assert_eq!(subtitle(None), DEFAULT_SUBTITLE);
        assert_eq!(subtitle(Some("05/07/1990")), DEFAULT_SUBTITLE);
    }

    #[test]
    fn color_meaning_short_gets_suffix() {
        let (short, long) = split_color_meaning("차분함과 신뢰의 색. 집중이 필요한 날에 어울립니다. 마음을 가라앉혀요");
        assert_eq!(short, "차분함과 신뢰의 색입니다");
        assert_eq!(long, "집중이 필요한 날에 어울립니다.  마음을 가라앉혀요");
    }

    #[test]
    fn color_meaning_already_polite_is_untouched() {
        let (short, long) = split_color_meaning("행운의 색입니다。");
        assert_eq!(short, "행운의 색입니다");
        assert_eq!(long, "");
    }

    #[test]
    fn empty_meaning_stays_empty() {
        assert_eq!(split_color_meaning(""), (String::new(), String::new()));
    }

    #[test]
    fn drink_description_splits_on_sentence_marks() {
        let (short, long) = split_drink_description("부드러운 라떼! 우유 거품이 풍성해요. 오후에 좋아요?");
        assert_eq!(short, "부드러운 라떼");
        assert_eq!(long, "우유 거품이 풍성해요. 오후에 좋아요");
    }

    #[test]
    fn price_is_grouped_in_won() {
        assert_eq!(format_price("12900").as_deref(), Some("12,900원"));
        assert_eq!(format_price("1234567").as_deref(), Some("1,234,567원"));
        assert_eq!(format_price("990").as_deref(), Some("990원"));
        assert_eq!(format_price("15000.50").as_deref(), Some("15,000원"));
    }

    #[test]
    fn unusable_prices_are_hidden() {
        assert_eq!(format_price(""), None);
        assert_eq!(format_price("무료"), None);
        assert_eq!(format_price("0"), None);
    }

    #[test]
    fn banner_runs_between_stops() {
        let vars = ThemeVars::from_color(&Color {
            hex: "#3366CC".into(),
            name: "블루".into(),
            meaning: None,
            rgb: None,
        })
        .unwrap();
        let banner = gradient_banner(&vars, 4);
        assert!(banner.starts_with("\x1b[48;2;71;143;255m "));
        assert!(banner.contains("\x1b[48;2;61;122;245m "));
        assert!(banner.ends_with(RESET));
    }

    #[test]
    fn manual_copy_notice_shows_url() {
        let notice = copy_notice(&CopyOutcome::Manual("https://s/x".into()));
        assert!(notice.ends_with("\n\nhttps://s/x"));
        assert_eq!(copy_notice(&CopyOutcome::CopiedLegacy), "URL이 복사되었습니다.");
    }

    #[test]
    fn session_render_includes_quote_author_and_date() {
        let mut session = Session::new("user_1");
        session.current_quote = Some(Quote {
            text: "별 헤는 밤\n\n계절이 지나가는 하늘에는".into(),
            author: Some("윤동주".into()),
            source: None,
            kind: Some("poem".into()),
        });
        let today: DayKey = "2024-03-02".parse().unwrap();
        let text = render_session(&session, today);
        assert!(text.contains(DEFAULT_SUBTITLE));
        assert!(text.contains("  별 헤는 밤\n  계절이 지나가는 하늘에는\n"));
        assert!(text.contains("- 윤동주 -"));
        assert!(text.contains("2024-03-02"));
        assert!(!text.contains("오늘의 컬러"));
    }
}
