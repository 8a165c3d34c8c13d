//! Terminal client for daily-line.
//!
//! Reads commands line by line from stdin and prints the day's content to
//! stdout. Diagnostics go to the log file (or stderr with
//! `file_logging = false`) so stdout stays readable.

use clap::{Parser, Subcommand};
use daily_line::clipboard::Clipboard;
use daily_line::config::DayBoundaryMode;
use daily_line::controller::{Command, Controller, ControllerOptions, ScreenEvent};
use daily_line::{AppConfig, Session, ThemeVars, render};
use daily_api::{Color, DailyClient, DailyOutcome};
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// daily-line: today's quote, colour and drink for your birth date.
#[derive(Parser)]
#[command(name = "daily-line", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file.
    #[arg(long)]
    server: Option<String>,

    /// Day boundary offset from UTC in minutes (default 540, UTC+9).
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<i32>,

    /// Use the host's local timezone for the day boundary.
    #[arg(long, conflicts_with = "utc_offset")]
    local_time: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Cmd>,
}

/// Available commands.
#[derive(Subcommand)]
enum Cmd {
    /// Show today's content and keep it current (default).
    Run,

    /// Print today's content once and exit.
    Today,

    /// Print the theme derived from a hex colour.
    Theme {
        /// Colour as `#RRGGBB`.
        hex: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Cmd::Theme { hex }) = &cli.command {
        return print_theme(hex);
    }

    let config = load_config(&cli)?;
    let _log_guard = daily_line::logging::init(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "daily-line starting");

    let user_id = daily_line::identity::load_or_create(&daily_line::app_dirs::identity_file())?;
    let client = DailyClient::new(&config.api)?;
    info!(server = %client.base_url(), "backend configured");

    let result = match cli.command.unwrap_or(Cmd::Run) {
        Cmd::Today => print_today(&config, &client, &user_id).await,
        Cmd::Run | Cmd::Theme { .. } => run_interactive(&config, client, user_id).await,
    };
    if let Err(e) = &result {
        error!(error = %e, "daily-line exited with error");
    }
    result
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default(&path)?;

    if let Some(server) = &cli.server {
        config.api.base_url = server.clone();
    }
    if let Some(offset) = cli.utc_offset {
        config.schedule.day_boundary = DayBoundaryMode::Fixed;
        config.schedule.utc_offset_minutes = offset;
    }
    if cli.local_time {
        config.schedule.day_boundary = DayBoundaryMode::Local;
    }

    config.validate()?;
    Ok(config)
}

fn print_theme(hex: &str) -> anyhow::Result<()> {
    let color = Color {
        hex: hex.to_owned(),
        name: String::new(),
        meaning: None,
        rgb: None,
    };
    let Some(vars) = ThemeVars::from_color(&color) else {
        anyhow::bail!("'{hex}' is not a 6-digit hex colour");
    };
    print!("{}", render::render_theme(&vars));
    Ok(())
}

async fn print_today(
    config: &AppConfig,
    client: &DailyClient,
    user_id: &str,
) -> anyhow::Result<()> {
    let boundary = config.schedule.day_boundary()?;
    let mut session = Session::new(user_id);
    session.birth_date = client.get_birthday(user_id).await.unwrap_or_default();

    match client.fetch_daily(user_id).await? {
        DailyOutcome::Ready(content) => {
            let today = boundary.date_key(chrono::Utc::now());
            let ticket = session.begin_load();
            session.finish_daily(ticket, content, today);
            print!("{}", render::render_session(&session, today));
            Ok(())
        }
        DailyOutcome::RequiresBirthday(message) => {
            anyhow::bail!("{message} (daily-line birthday YYYY-MM-DD)")
        }
    }
}

async fn run_interactive(
    config: &AppConfig,
    client: DailyClient,
    user_id: String,
) -> anyhow::Result<()> {
    let options = ControllerOptions::from_config(config)?;
    let (screen_tx, screen_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let clipboard = Clipboard::detect().await;
    let controller = Controller::new(client, user_id, options, clipboard, screen_tx.clone());
    let resume = controller.resume_handle();

    let printer = tokio::spawn(print_screen(screen_rx));
    // A plain thread, so a pending stdin read cannot hold up runtime shutdown.
    std::thread::spawn(move || read_commands(&command_tx, &screen_tx));

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            ctrl_c_cancel.cancel();
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        // SIGCONT arrives when a stopped job is resumed (`fg`).
        match signal(SignalKind::from_raw(libc::SIGCONT)) {
            Ok(mut cont) => {
                let resume = std::sync::Arc::clone(&resume);
                tokio::spawn(async move {
                    while cont.recv().await.is_some() {
                        info!("resumed, checking date");
                        resume.notify_one();
                    }
                });
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for SIGCONT"),
        }
    }
    #[cfg(not(unix))]
    let _ = resume;

    println!("{}", daily_line::controller::HELP_TEXT);
    controller.run(command_rx, cancel).await?;
    // Share tasks may still hold senders; give queued output a moment.
    let _ = tokio::time::timeout(std::time::Duration::from_millis(200), printer).await;
    info!("daily-line shut down cleanly");
    Ok(())
}

fn read_commands(
    commands: &mpsc::UnboundedSender<Command>,
    screen: &mpsc::UnboundedSender<ScreenEvent>,
) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let sent = match line.parse::<Command>() {
            Ok(cmd) => commands.send(cmd).is_ok(),
            Err(message) => screen.send(ScreenEvent::Error(message)).is_ok(),
        };
        if !sent {
            break;
        }
    }
}

async fn print_screen(mut events: mpsc::UnboundedReceiver<ScreenEvent>) {
    let interactive = std::io::stdout().is_terminal();
    while let Some(event) = events.recv().await {
        match event {
            ScreenEvent::Loading(true) => println!("불러오는 중..."),
            ScreenEvent::Loading(false) => {}
            ScreenEvent::Content(text) => {
                if interactive {
                    print!("\x1b[2J\x1b[H");
                }
                print!("{text}");
            }
            ScreenEvent::Message(message) => println!("{message}"),
            ScreenEvent::Error(message) => println!("⚠️  {message}"),
            ScreenEvent::PromptBirthday(reason) => {
                println!("{reason}");
                println!("생년월일을 입력하세요 (YYYY-MM-DD):");
            }
            ScreenEvent::Shared {
                message,
                link: _,
                outcome,
            } => {
                println!("{message}\n");
                println!("{}", render::copy_notice(&outcome));
            }
        }
    }
}
