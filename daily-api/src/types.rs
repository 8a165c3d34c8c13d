//! Wire types for the backend's JSON envelopes and the day's content.

use serde::{Deserialize, Deserializer, Serialize};

/// The `{ success, data, error, requires_birthday }` envelope every
/// endpoint answers with, regardless of HTTP status.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Whether the backend handled the request.
    #[serde(default)]
    pub success: bool,
    /// Payload on success. A missing field decodes as `None`.
    pub data: Option<T>,
    /// Human-readable failure message.
    #[serde(default)]
    pub error: Option<String>,
    /// Set when the daily endpoint needs a birth date first.
    #[serde(default)]
    pub requires_birthday: bool,
}

/// A quote or short poem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Body text; may contain newlines for poems.
    pub text: String,
    /// Attributed author.
    #[serde(default)]
    pub author: Option<String>,
    /// Where the quote was taken from.
    #[serde(default)]
    pub source: Option<String>,
    /// `quote` or `poem`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// The day's colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// `#RRGGBB`; not validated here, theming parses it strictly. Missing
    /// or `null` decodes as empty, which theming skips.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hex: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Free-text meaning, one or more sentences.
    #[serde(default)]
    pub meaning: Option<String>,
    /// Channel values, when the backend supplies three in `0..=255`.
    /// Anything else decodes as `None` so theming falls back to `hex`.
    #[serde(default, deserialize_with = "lenient_rgb")]
    pub rgb: Option<[u8; 3]>,
}

/// The day's drink recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drink {
    /// Drink name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Emoji shown next to the name.
    #[serde(default)]
    pub emoji: Option<String>,
    /// `coffee` or `tea`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Localised drink type label.
    #[serde(default)]
    pub type_korean: Option<String>,
    /// Free-text description, one or more sentences.
    #[serde(default)]
    pub description: Option<String>,
}

/// The day's flower.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Flower {
    /// Flower name.
    #[serde(default)]
    pub name: Option<String>,
    /// Emoji shown above the name.
    #[serde(default)]
    pub emoji: Option<String>,
    /// Source of the flower-of-the-day listing.
    #[serde(default)]
    pub source: Option<String>,
    /// Flower language meaning.
    #[serde(default)]
    pub meaning: Option<String>,
}

/// A recommended shopping item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// Product name.
    #[serde(default)]
    pub name: Option<String>,
    /// Product or search page link.
    #[serde(default)]
    pub link: Option<String>,
    /// Product image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Lowest price in won; the backend sends it as a string, sometimes a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: Option<String>,
    /// Shop name.
    #[serde(default, rename = "mallName")]
    pub mall_name: Option<String>,
}

/// Payload of `GET /api/daily`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyContent {
    /// Quote of the day.
    pub quote: Quote,
    /// Colour of the day.
    #[serde(default)]
    pub color: Option<Color>,
    /// Drink of the day.
    #[serde(default)]
    pub drink: Option<Drink>,
    /// Flower of the day.
    #[serde(default)]
    pub flower: Option<Flower>,
    /// Shopping recommendations; only the first is shown.
    #[serde(default, deserialize_with = "null_as_default")]
    pub shopping_items: Vec<ShoppingItem>,
    /// Backend's day key for this content.
    #[serde(default)]
    pub date: Option<String>,
}

/// Payload of `GET /api/quote` with a random seed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RandomContent {
    /// A different quote.
    pub quote: Quote,
    /// Optional colour to re-theme with.
    #[serde(default)]
    pub color: Option<Color>,
}

/// Result of asking for the day's content.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyOutcome {
    /// Content is available.
    Ready(DailyContent),
    /// No birth date stored for this user; carries the backend's message.
    RequiresBirthday(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BirthdayData {
    #[serde(default)]
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ShortUrlData {
    #[serde(default)]
    pub short_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveBirthdayRequest<'a> {
    pub user_id: &'a str,
    pub birth_date: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShortenRequest<'a> {
    pub url: &'a str,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) if !s.trim().is_empty() => Some(s),
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(f)) => Some(format!("{}", f.trunc())),
        _ => None,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_rgb<'de, D>(deserializer: D) -> Result<Option<[u8; 3]>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(channels)) = raw else {
        return Ok(None);
    };
    if channels.len() != 3 {
        return Ok(None);
    }
    let mut rgb = [0u8; 3];
    for (slot, value) in rgb.iter_mut().zip(&channels) {
        match value.as_u64().and_then(|v| u8::try_from(v).ok()) {
            Some(channel) => *slot = channel,
            None => return Ok(None),
        }
    }
    Ok(Some(rgb))
}
