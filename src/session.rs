//! Client session state.
//!
//! Owned by the controller task. Loads are ticketed: every request takes a
//! [`LoadTicket`] from [`Session::begin_load`], and only the most recent
//! ticket may write its result back, so a slow response for a superseded
//! request can never overwrite newer content.

use crate::scheduler::DayKey;
use crate::theme::ThemeState;
use daily_api::{Color, DailyContent, Drink, Flower, Quote, RandomContent, ShoppingItem};

/// Proof that a load was started; compared against the session's latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Sequence number of this ticket.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Everything the client knows about the current user and the shown content.
#[derive(Debug, Clone)]
pub struct Session {
    /// Persisted client identifier.
    pub user_id: String,
    /// Stored birth date as `YYYY-MM-DD`.
    pub birth_date: Option<String>,
    /// Quote on screen.
    pub current_quote: Option<Quote>,
    /// Colour on screen.
    pub current_color: Option<Color>,
    /// Drink on screen.
    pub current_drink: Option<Drink>,
    /// Flower on screen.
    pub current_flower: Option<Flower>,
    /// Shopping recommendations on screen.
    pub shopping_items: Vec<ShoppingItem>,
    /// Day the daily content was last loaded for.
    pub last_loaded_date: Option<DayKey>,
    /// Active theme.
    pub theme: ThemeState,
    latest_ticket: u64,
}

impl Session {
    /// Fresh session for `user_id` with nothing loaded.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            birth_date: None,
            current_quote: None,
            current_color: None,
            current_drink: None,
            current_flower: None,
            shopping_items: Vec::new(),
            last_loaded_date: None,
            theme: ThemeState::default(),
            latest_ticket: 0,
        }
    }

    /// Start a load, superseding any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        LoadTicket(self.latest_ticket)
    }

    /// Whether `ticket` belongs to the most recent load.
    pub fn is_latest(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest_ticket
    }

    /// Apply the day's content loaded under `ticket`.
    ///
    /// Records `today` as the last loaded day. Returns `false` and changes
    /// nothing when the ticket has been superseded.
    pub fn finish_daily(
        &mut self,
        ticket: LoadTicket,
        content: DailyContent,
        today: DayKey,
    ) -> bool {
        if !self.is_latest(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "discarding stale daily load"
            );
            return false;
        }
        self.current_quote = Some(content.quote);
        if let Some(color) = content.color {
            self.show_color(color);
        }
        if let Some(drink) = content.drink {
            self.current_drink = Some(drink);
        }
        if let Some(flower) = content.flower {
            self.current_flower = Some(flower);
        }
        if !content.shopping_items.is_empty() {
            self.shopping_items = content.shopping_items;
        }
        self.last_loaded_date = Some(today);
        true
    }

    /// Apply a random quote loaded under `ticket`.
    ///
    /// The last loaded day is left alone: a random quote is not the day's content.
    pub fn finish_random(&mut self, ticket: LoadTicket, content: RandomContent) -> bool {
        if !self.is_latest(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "discarding stale random load"
            );
            return false;
        }
        self.current_quote = Some(content.quote);
        if let Some(color) = content.color {
            self.show_color(color);
        }
        true
    }

    fn show_color(&mut self, color: Color) {
        self.theme.apply(&color);
        self.current_color = Some(color);
    }
}
