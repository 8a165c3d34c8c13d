//! Midnight refresh timer.
//!
//! [`MidnightScheduler`] keeps exactly one pending timer that fires at the
//! next midnight of its [`DayBoundary`] and re-arms itself after each
//! firing. Scheduling again cancels the previous timer first, and every
//! firing carries the generation it was armed under so a late delivery
//! from a superseded timer can be told apart and dropped.

use crate::scheduler::day::{Clock, DayBoundary, DayKey};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why the date watcher asked for a date comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckReason {
    /// Periodic poll.
    Interval,
    /// The process came back from the background or was asked to check.
    Resumed,
}

/// Events delivered to the controller by the rollover machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverEvent {
    /// The midnight timer fired.
    Midnight {
        /// Generation the timer was armed under.
        generation: u64,
        /// Day that just started.
        key: DayKey,
    },
    /// Compare the loaded day against today.
    DateCheck {
        /// What triggered the check.
        reason: CheckReason,
    },
}

struct PendingTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the single pending midnight timer.
pub struct MidnightScheduler {
    boundary: DayBoundary,
    clock: Clock,
    event_tx: mpsc::UnboundedSender<RolloverEvent>,
    generation: Arc<AtomicU64>,
    pending: Option<PendingTimer>,
}

impl MidnightScheduler {
    /// Create a scheduler that reports firings on `event_tx`.
    ///
    /// Nothing is armed until [`schedule`](Self::schedule) is called.
    pub fn new(
        boundary: DayBoundary,
        clock: Clock,
        event_tx: mpsc::UnboundedSender<RolloverEvent>,
    ) -> Self {
        Self {
            boundary,
            clock,
            event_tx,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    /// Day boundary this scheduler fires on.
    pub fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    /// Cancel any pending timer and arm a fresh one for the next midnight.
    ///
    /// Returns the delay until the first firing. Must be called from within
    /// a tokio runtime.
    pub fn schedule(&mut self) -> Duration {
        self.cancel();
        let generation = self.generation.load(Ordering::SeqCst);

        let now = (self.clock)();
        let delay_ms = self.boundary.millis_until_next_midnight(now);
        let target = now + chrono::Duration::milliseconds(delay_ms as i64);
        info!(
            delay_ms,
            boundary = %self.boundary,
            next_day = %self.boundary.date_key(target),
            "midnight refresh armed"
        );

        let cancel = CancellationToken::new();
        let timer = Timer {
            boundary: self.boundary,
            clock: Arc::clone(&self.clock),
            event_tx: self.event_tx.clone(),
            generation_counter: Arc::clone(&self.generation),
            generation,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(timer.run(target));
        self.pending = Some(PendingTimer { cancel, handle });

        Duration::from_millis(delay_ms)
    }

    /// Cancel the pending timer, if any.
    ///
    /// Bumps the generation so a firing already queued on the channel is
    /// recognised as stale.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
            pending.handle.abort();
            debug!("pending midnight refresh cancelled");
        }
    }

    /// Whether a timer is currently armed.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }

    /// Whether a firing tagged with `generation` came from the live timer.
    pub fn is_current(&self, generation: u64) -> bool {
        self.pending.is_some() && self.generation.load(Ordering::SeqCst) == generation
    }
}

impl Drop for MidnightScheduler {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
            pending.handle.abort();
        }
    }
}

struct Timer {
    boundary: DayBoundary,
    clock: Clock,
    event_tx: mpsc::UnboundedSender<RolloverEvent>,
    generation_counter: Arc<AtomicU64>,
    generation: u64,
    cancel: CancellationToken,
}

impl Timer {
    async fn run(self, first_target: DateTime<Utc>) {
        let mut target = first_target;
        loop {
            let wait = (target - (self.clock)()).to_std().unwrap_or(Duration::ZERO);
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
            if self.generation_counter.load(Ordering::SeqCst) != self.generation {
                break;
            }

            let fired_at = (self.clock)().max(target);
            let key = self.boundary.date_key(fired_at);
            info!(day = %key, "midnight reached, requesting refresh");
            let event = RolloverEvent::Midnight {
                generation: self.generation,
                key,
            };
            if self.event_tx.send(event).is_err() {
                warn!("rollover channel closed, midnight timer stopping");
                break;
            }

            // Never re-arm for the midnight that just fired, even if the
            // clock reads slightly behind the timer.
            target = self.boundary.next_midnight(fired_at);
            debug!(next = %target, "midnight refresh re-armed");
        }
    }
}
