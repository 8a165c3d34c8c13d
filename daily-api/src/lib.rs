//! # daily-api
//!
//! Typed HTTP client for the daily-line backend.
//!
//! ## Endpoints
//!
//! - `GET /api/birthday/{user_id}` and `POST /api/birthday`
//! - `GET /api/daily?user_id=` for the day's quote, colour, drink, flower
//!   and shopping recommendation
//! - `GET /api/quote?user_id=&random=` for a different quote on demand
//! - `POST /api/shorten-url` for share links
//!
//! ## Error model
//!
//! Transport and decoding failures surface as [`ApiError::Http`],
//! [`ApiError::Timeout`] or [`ApiError::Parse`]. A backend answer with
//! `success: false` becomes [`ApiError::Rejected`] carrying the backend's
//! message, except for the daily endpoint's `requires_birthday` case,
//! which is the [`DailyOutcome::RequiresBirthday`] variant. Nothing is
//! retried.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> daily_api::Result<()> {
//! let client = daily_api::DailyClient::new(&daily_api::ApiConfig::default())?;
//! if let daily_api::DailyOutcome::Ready(content) = client.fetch_daily("user_1").await? {
//!     println!("{}", content.quote.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::DailyClient;
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use types::{
    Color, DailyContent, DailyOutcome, Drink, Flower, Quote, RandomContent, ShoppingItem,
};
