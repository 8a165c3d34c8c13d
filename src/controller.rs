//! The client's event loop.
//!
//! [`Controller`] owns the [`Session`] and is the only writer to it. It
//! reacts to user commands, midnight timer firings, date checks, and load
//! completions, and reports everything the user should see as
//! [`ScreenEvent`]s.
//!
//! Network requests run on spawned tasks and report back over a channel.
//! Starting a load aborts the one still in flight, and the session ticket
//! discards anything that slips through anyway.

use crate::clipboard::{Clipboard, CopyOutcome};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::render;
use crate::scheduler::{
    CheckReason, Clock, DateWatcher, DayBoundary, DayKey, MidnightScheduler, RolloverEvent,
};
use crate::session::{LoadTicket, Session};
use crate::share;
use chrono::NaiveDate;
use daily_api::client::BIRTHDAY_REQUIRED_MESSAGE;
use daily_api::{ApiError, DailyClient, DailyOutcome, RandomContent};
use rand::Rng;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shown after a birth date was saved.
pub const BIRTHDAY_SAVED_MESSAGE: &str = "생년월일이 저장되었습니다! 새로운 명언을 불러옵니다...";

/// Shown when the birthday command has no date.
pub const BIRTHDAY_MISSING_MESSAGE: &str = "생년월일을 입력해주세요.";

/// Prefix of transport error messages.
pub const GENERIC_ERROR_PREFIX: &str = "오류가 발생했습니다: ";

/// Command reference printed by `help`.
pub const HELP_TEXT: &str = "\
명령어:
  refresh              다른 한 줄 보기
  reload               오늘의 한 줄 다시 불러오기
  birthday YYYY-MM-DD  생년월일 저장
  edit                 생년월일 수정
  share                공유 링크 복사
  check                날짜 변경 확인
  help                 도움말
  quit                 종료";

/// A user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load a different, random quote.
    Refresh,
    /// Reload the day's content.
    Reload,
    /// Save a birth date and reload.
    Birthday(String),
    /// Show the birth date prompt again.
    Edit,
    /// Build a share link and copy it.
    Share,
    /// Compare the loaded day against today now.
    Check,
    /// Show the command list.
    Help,
    /// Stop the client.
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(HELP_TEXT.to_owned());
        };
        let cmd = match head.to_ascii_lowercase().as_str() {
            "refresh" | "r" => Self::Refresh,
            "reload" => Self::Reload,
            "birthday" | "b" => match parts.next() {
                Some(date) => Self::Birthday(date.to_owned()),
                None => return Err(BIRTHDAY_MISSING_MESSAGE.to_owned()),
            },
            "edit" => Self::Edit,
            "share" | "s" => Self::Share,
            "check" => Self::Check,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            // A bare date answers the birth date prompt.
            other if NaiveDate::parse_from_str(other, "%Y-%m-%d").is_ok() => {
                Self::Birthday(other.to_owned())
            }
            other => return Err(format!("알 수 없는 명령입니다: {other} (help 입력)")),
        };
        Ok(cmd)
    }
}

/// Something the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    /// A request started or finished.
    Loading(bool),
    /// The full content view.
    Content(String),
    /// Informational message.
    Message(String),
    /// Error message.
    Error(String),
    /// Ask for a birth date, with the reason.
    PromptBirthday(String),
    /// A share link was produced.
    Shared {
        /// Share text including the link.
        message: String,
        /// Link that was copied.
        link: String,
        /// How the copy went.
        outcome: CopyOutcome,
    },
}

/// Settings the controller needs beyond the client.
#[derive(Clone)]
pub struct ControllerOptions {
    /// Which clock defines "today".
    pub boundary: DayBoundary,
    /// Source of "now".
    pub clock: Clock,
    /// Page URL share links point at.
    pub page_url: String,
    /// Date watcher poll interval.
    pub poll_interval: Duration,
}

impl ControllerOptions {
    /// Options from configuration, using the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the day boundary is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            boundary: config.schedule.day_boundary()?,
            clock: crate::scheduler::system_clock(),
            page_url: config.page_url(),
            poll_interval: Duration::from_secs(config.schedule.poll_interval_secs),
        })
    }
}

#[derive(Debug)]
enum LoadResult {
    Daily(std::result::Result<DailyOutcome, ApiError>),
    Random(std::result::Result<RandomContent, ApiError>),
}

#[derive(Debug)]
enum Completion {
    Load {
        ticket: LoadTicket,
        result: LoadResult,
    },
    BirthdaySaved {
        birth_date: String,
        result: std::result::Result<(), ApiError>,
    },
}

enum Step {
    Stop,
    Command(Command),
    Rollover(RolloverEvent),
    Completed(Completion),
}

/// Owns the session and drives every state change.
pub struct Controller {
    client: Arc<DailyClient>,
    session: Session,
    clock: Clock,
    page_url: String,
    scheduler: MidnightScheduler,
    watcher: Option<DateWatcher>,
    watcher_cancel: CancellationToken,
    resume: Arc<Notify>,
    rollover_rx: mpsc::UnboundedReceiver<RolloverEvent>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    clipboard: Arc<Clipboard>,
    screen: mpsc::UnboundedSender<ScreenEvent>,
    inflight: Option<JoinHandle<()>>,
}

impl Controller {
    /// Create a controller for `user_id`.
    ///
    /// Nothing runs until [`run`](Self::run) is awaited.
    pub fn new(
        client: DailyClient,
        user_id: impl Into<String>,
        options: ControllerOptions,
        clipboard: Clipboard,
        screen: mpsc::UnboundedSender<ScreenEvent>,
    ) -> Self {
        let (rollover_tx, rollover_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let watcher_cancel = CancellationToken::new();
        let watcher = DateWatcher::new(rollover_tx.clone(), watcher_cancel.clone())
            .with_poll_interval(options.poll_interval);
        let resume = watcher.resume_handle();
        let scheduler =
            MidnightScheduler::new(options.boundary, Arc::clone(&options.clock), rollover_tx);

        Self {
            client: Arc::new(client),
            session: Session::new(user_id),
            clock: options.clock,
            page_url: options.page_url,
            scheduler,
            watcher: Some(watcher),
            watcher_cancel,
            resume,
            rollover_rx,
            completion_tx,
            completion_rx,
            clipboard: Arc::new(clipboard),
            screen,
            inflight: None,
        }
    }

    /// Handle that triggers an immediate date check when notified.
    ///
    /// The binary notifies it when the process is resumed.
    pub fn resume_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.resume)
    }

    /// Current session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until `commands` closes, `quit` is entered, or `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Channel`] if the screen receiver is gone.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        cancel: CancellationToken,
    ) -> Result<()> {
        self.start().await?;

        let watcher_task = self.watcher.take().map(|w| tokio::spawn(w.run()));
        self.scheduler.schedule();

        let outcome = loop {
            let step = tokio::select! {
                _ = cancel.cancelled() => Step::Stop,
                cmd = commands.recv() => match cmd {
                    Some(Command::Quit) | None => Step::Stop,
                    Some(cmd) => Step::Command(cmd),
                },
                Some(event) = self.rollover_rx.recv() => Step::Rollover(event),
                Some(done) = self.completion_rx.recv() => Step::Completed(done),
            };

            let handled = match step {
                Step::Stop => break Ok(()),
                Step::Command(cmd) => self.handle_command(cmd),
                Step::Rollover(event) => self.handle_rollover(event),
                Step::Completed(done) => self.handle_completion(done),
            };
            if let Err(e) = handled {
                break Err(e);
            }
        };

        info!("controller stopping");
        self.watcher_cancel.cancel();
        self.scheduler.cancel();
        if let Some(task) = self.inflight.take() {
            task.abort();
        }
        if let Some(task) = watcher_task {
            let _ = task.await;
        }
        outcome
    }

    /// Look up the stored birth date, then load the day or ask for a date.
    ///
    /// A failed lookup is treated like a missing birth date.
    async fn start(&mut self) -> Result<()> {
        match self.client.get_birthday(&self.session.user_id).await {
            Ok(Some(date)) => {
                info!("stored birth date found");
                self.session.birth_date = Some(date);
                self.load_daily()
            }
            Ok(None) => {
                info!("no stored birth date");
                self.show(ScreenEvent::PromptBirthday(render::DEFAULT_SUBTITLE.to_owned()))
            }
            Err(e) => {
                warn!(error = %e, "birth date lookup failed");
                self.show(ScreenEvent::PromptBirthday(render::DEFAULT_SUBTITLE.to_owned()))
            }
        }
    }

    fn show(&self, event: ScreenEvent) -> Result<()> {
        self.screen
            .send(event)
            .map_err(|_| AppError::Channel("screen receiver dropped".into()))
    }

    fn today(&self) -> DayKey {
        self.scheduler.boundary().date_key((self.clock)())
    }

    fn handle_command(&mut self, cmd: Command) -> Result<()> {
        debug!(?cmd, "command");
        match cmd {
            Command::Refresh => self.load_random(),
            Command::Reload => self.load_daily(),
            Command::Birthday(date) => self.save_birthday(date),
            Command::Edit => self.show(ScreenEvent::PromptBirthday(render::subtitle(
                self.session.birth_date.as_deref(),
            ))),
            Command::Share => self.share(),
            Command::Check => {
                self.resume.notify_one();
                Ok(())
            }
            Command::Help => self.show(ScreenEvent::Message(HELP_TEXT.to_owned())),
            Command::Quit => Ok(()),
        }
    }

    fn handle_rollover(&mut self, event: RolloverEvent) -> Result<()> {
        match event {
            RolloverEvent::Midnight { generation, key } => {
                if !self.scheduler.is_current(generation) {
                    debug!(generation, "ignoring superseded midnight firing");
                    return Ok(());
                }
                info!(day = %key, "new day, reloading content");
                self.load_daily()
            }
            RolloverEvent::DateCheck { reason } => {
                let now = (self.clock)();
                let boundary = self.scheduler.boundary();
                match boundary.poll_for_date_change(self.session.last_loaded_date, now) {
                    Some(today) => {
                        info!(
                            ?reason,
                            from = ?self.session.last_loaded_date.map(|k| k.to_string()),
                            to = %today,
                            "date changed, reloading content"
                        );
                        self.load_daily()
                    }
                    None => {
                        if reason == CheckReason::Resumed {
                            debug!("date unchanged after resume");
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    fn begin_load(&mut self) -> Result<LoadTicket> {
        if let Some(previous) = self.inflight.take() {
            previous.abort();
        }
        self.show(ScreenEvent::Loading(true))?;
        Ok(self.session.begin_load())
    }

    fn load_daily(&mut self) -> Result<()> {
        let ticket = self.begin_load()?;
        let client = Arc::clone(&self.client);
        let user_id = self.session.user_id.clone();
        let tx = self.completion_tx.clone();
        debug!(ticket = ticket.id(), "loading daily content");
        self.inflight = Some(tokio::spawn(async move {
            let result = LoadResult::Daily(client.fetch_daily(&user_id).await);
            let _ = tx.send(Completion::Load { ticket, result });
        }));
        Ok(())
    }

    fn load_random(&mut self) -> Result<()> {
        let ticket = self.begin_load()?;
        let client = Arc::clone(&self.client);
        let user_id = self.session.user_id.clone();
        let tx = self.completion_tx.clone();
        let seed = random_seed((self.clock)().timestamp_millis());
        debug!(ticket = ticket.id(), %seed, "loading random quote");
        self.inflight = Some(tokio::spawn(async move {
            let result = LoadResult::Random(client.fetch_random(&user_id, &seed).await);
            let _ = tx.send(Completion::Load { ticket, result });
        }));
        Ok(())
    }

    fn save_birthday(&mut self, input: String) -> Result<()> {
        let input = input.trim().to_owned();
        if input.is_empty() {
            return self.show(ScreenEvent::Error(BIRTHDAY_MISSING_MESSAGE.to_owned()));
        }
        if NaiveDate::parse_from_str(&input, "%Y-%m-%d").is_err() {
            let err = AppError::InvalidBirthDate(format!("'{input}', expected YYYY-MM-DD"));
            return self.show(ScreenEvent::Error(err.to_string()));
        }

        self.show(ScreenEvent::Loading(true))?;
        let client = Arc::clone(&self.client);
        let user_id = self.session.user_id.clone();
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = client.save_birthday(&user_id, &input).await;
            let _ = tx.send(Completion::BirthdaySaved {
                birth_date: input,
                result,
            });
        });
        Ok(())
    }

    fn share(&mut self) -> Result<()> {
        let long_url = match share::share_url(&self.session, &self.page_url) {
            Ok(url) => url,
            Err(e) => return self.show(ScreenEvent::Error(e.to_string())),
        };
        let client = Arc::clone(&self.client);
        let clipboard = Arc::clone(&self.clipboard);
        let screen = self.screen.clone();
        let session = self.session.clone();
        tokio::spawn(async move {
            let link = share::resolve_share_link(&client, &long_url).await;
            let outcome = clipboard.copy(&link).await;
            let message = share::share_message(&session, &link);
            let _ = screen.send(ScreenEvent::Shared {
                message,
                link,
                outcome,
            });
        });
        Ok(())
    }

    fn handle_completion(&mut self, done: Completion) -> Result<()> {
        match done {
            Completion::Load { ticket, result } => {
                if !self.session.is_latest(ticket) {
                    debug!(ticket = ticket.id(), "dropping superseded load result");
                    return Ok(());
                }
                self.inflight = None;
                self.show(ScreenEvent::Loading(false))?;
                match result {
                    LoadResult::Daily(result) => self.finish_daily(ticket, result),
                    LoadResult::Random(result) => self.finish_random(ticket, result),
                }
            }
            Completion::BirthdaySaved { birth_date, result } => {
                self.show(ScreenEvent::Loading(false))?;
                match result {
                    Ok(()) => {
                        info!("birth date saved");
                        self.session.birth_date = Some(birth_date);
                        self.show(ScreenEvent::Message(BIRTHDAY_SAVED_MESSAGE.to_owned()))?;
                        self.load_daily()
                    }
                    Err(e) => self.show(ScreenEvent::Error(user_message(&e))),
                }
            }
        }
    }

    fn finish_daily(
        &mut self,
        ticket: LoadTicket,
        result: std::result::Result<DailyOutcome, ApiError>,
    ) -> Result<()> {
        match result {
            Ok(DailyOutcome::Ready(content)) => {
                let today = self.today();
                if self.session.finish_daily(ticket, content, today) {
                    info!(day = %today, "daily content loaded");
                    self.show(ScreenEvent::Content(render::render_session(
                        &self.session,
                        today,
                    )))?;
                    self.scheduler.schedule();
                }
                Ok(())
            }
            Ok(DailyOutcome::RequiresBirthday(reason)) => {
                debug!(%reason, "backend wants a birth date");
                self.show(ScreenEvent::PromptBirthday(
                    BIRTHDAY_REQUIRED_MESSAGE.to_owned(),
                ))
            }
            Err(e) => {
                warn!(error = %e, "daily load failed");
                self.show(ScreenEvent::Error(user_message(&e)))
            }
        }
    }

    fn finish_random(
        &mut self,
        ticket: LoadTicket,
        result: std::result::Result<RandomContent, ApiError>,
    ) -> Result<()> {
        match result {
            Ok(content) => {
                if self.session.finish_random(ticket, content) {
                    let today = self.today();
                    self.show(ScreenEvent::Content(render::render_session(
                        &self.session,
                        today,
                    )))?;
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "random load failed");
                self.show(ScreenEvent::Error(user_message(&e)))
            }
        }
    }
}

/// Message shown for a failed request: the backend's own message when it
/// rejected the request, the generic prefix otherwise.
pub fn user_message(err: &ApiError) -> String {
    match err {
        ApiError::Rejected(message) => message.clone(),
        other => format!("{GENERIC_ERROR_PREFIX}{other}"),
    }
}

/// Seed for the random quote endpoint: epoch millis plus a random fraction.
pub fn random_seed(now_millis: i64) -> String {
    let fraction: f64 = rand::thread_rng().r#gen();
    format!("{:.6}", now_millis as f64 + fraction)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("refresh".parse::<Command>(), Ok(Command::Refresh));
        assert_eq!("  RELOAD ".parse::<Command>(), Ok(Command::Reload));
        assert_eq!(
            "birthday 1990-05-17".parse::<Command>(),
            Ok(Command::Birthday("1990-05-17".into()))
        );
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("check".parse::<Command>(), Ok(Command::Check));
    }

    #[test]
    fn bare_date_is_a_birthday() {
        assert_eq!(
            "1990-05-17".parse::<Command>(),
            Ok(Command::Birthday("1990-05-17".into()))
        );
    }

    #[test]
    fn birthday_without_date_asks_for_one() {
        assert_eq!(
            "birthday".parse::<Command>(),
            Err(BIRTHDAY_MISSING_MESSAGE.to_owned())
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        let err = "dance".parse::<Command>().unwrap_err();
        assert!(err.contains("dance"));
    }

    #[test]
    fn rejected_errors_show_backend_message() {
        let err = ApiError::Rejected("저장에 실패했습니다.".into());
        assert_eq!(user_message(&err), "저장에 실패했습니다.");
    }

    #[test]
    fn transport_errors_get_generic_prefix() {
        let err = ApiError::Parse("expected value".into());
        assert!(user_message(&err).starts_with(GENERIC_ERROR_PREFIX));
    }

    #[test]
    fn seed_has_millis_and_fraction() {
        let seed = random_seed(1_709_337_600_000);
        let value: f64 = seed.parse().unwrap();
        assert!((1_709_337_600_000.0..1_709_337_600_001.0).contains(&value));
        assert!(seed.contains('.'));
    }
}
