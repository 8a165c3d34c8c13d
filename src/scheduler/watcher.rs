//! Periodic date-change detection.
//!
//! [`DateWatcher`] asks the controller to compare the loaded day against
//! today every poll interval (60 s by default) and whenever the process is
//! resumed. It backs up the midnight timer, which can fire late or not at
//! all after the host sleeps.

use crate::scheduler::runner::{CheckReason, RolloverEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default date poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Sends [`RolloverEvent::DateCheck`] on a fixed interval and on resume.
pub struct DateWatcher {
    event_tx: mpsc::UnboundedSender<RolloverEvent>,
    cancel: CancellationToken,
    poll_interval: Duration,
    resume: Arc<Notify>,
}

impl DateWatcher {
    /// Create a watcher that sends checks via `event_tx`.
    ///
    /// Call [`run`](Self::run) to start polling.
    pub fn new(event_tx: mpsc::UnboundedSender<RolloverEvent>, cancel: CancellationToken) -> Self {
        Self {
            event_tx,
            cancel,
            poll_interval: DEFAULT_POLL_INTERVAL,
            resume: Arc::new(Notify::new()),
        }
    }

    /// Override the poll interval. Zero is clamped to one second.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_secs(1));
        self
    }

    /// Handle used to signal that the process became active again.
    ///
    /// Each `notify_one` produces one immediate [`CheckReason::Resumed`] check.
    pub fn resume_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.resume)
    }

    /// Run the watcher loop until the cancellation token is cancelled.
    ///
    /// ```rust,ignore
    /// let watcher = DateWatcher::new(event_tx, cancel.child_token());
    /// let resume = watcher.resume_handle();
    /// tokio::spawn(watcher.run());
    /// ```
    pub async fn run(self) {
        let start = tokio::time::Instant::now() + self.poll_interval;
        let mut ticker = tokio::time::interval_at(start, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "date watcher started"
        );

        loop {
            let reason = tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("date watcher cancelled");
                    break;
                }
                _ = ticker.tick() => CheckReason::Interval,
                _ = self.resume.notified() => CheckReason::Resumed,
            };
            debug!(?reason, "date check requested");
            if self.event_tx.send(RolloverEvent::DateCheck { reason }).is_err() {
                warn!("date watcher: event channel closed, stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn polls_on_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let watcher = DateWatcher::new(tx, cancel.clone());
        let task = tokio::spawn(watcher.run());

        let early = tokio::time::timeout(Duration::from_secs(59), rx.recv()).await;
        assert!(early.is_err(), "no check before the first interval");

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            RolloverEvent::DateCheck {
                reason: CheckReason::Interval
            }
        );

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn resume_triggers_immediate_check() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let watcher = DateWatcher::new(tx, cancel.clone());
        let resume = watcher.resume_handle();
        let task = tokio::spawn(watcher.run());

        resume.notify_one();
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("resume check")
            .unwrap();
        assert_eq!(
            event,
            RolloverEvent::DateCheck {
                reason: CheckReason::Resumed
            }
        );

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn watcher_stops_on_cancel() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let watcher = DateWatcher::new(tx, cancel.clone());
        let task = tokio::spawn(watcher.run());

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), task).await;
        assert!(result.is_ok(), "watcher task should finish after cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_stops_when_channel_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = DateWatcher::new(tx, CancellationToken::new())
            .with_poll_interval(Duration::from_secs(1));
        drop(rx);

        let result =
            tokio::time::timeout(Duration::from_secs(5), tokio::spawn(watcher.run())).await;
        assert!(result.is_ok(), "watcher should stop once nobody listens");
    }

    #[test]
    fn zero_interval_is_clamped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let watcher =
            DateWatcher::new(tx, CancellationToken::new()).with_poll_interval(Duration::ZERO);
        assert_eq!(watcher.poll_interval, Duration::from_secs(1));
    }
}
