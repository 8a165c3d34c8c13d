//! Copying share links to the clipboard.
//!
//! Copying walks a fixed chain: the system clipboard, then the OSC 52
//! terminal escape, then giving the text back to show it for manual copy.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::io::{IsTerminal, Write};
use std::sync::mpsc as std_mpsc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// A way of placing text on the clipboard.
#[async_trait]
pub trait ClipboardBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Copy `text`.
    async fn copy(&self, text: &str) -> Result<()>;
}

/// How a copy request was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Copied through the system clipboard.
    Copied,
    /// Copied through the terminal escape fallback.
    CopiedLegacy,
    /// Nothing worked; the text must be shown for manual copy.
    Manual(String),
}

type CopyRequest = (String, oneshot::Sender<std::result::Result<(), String>>);

/// The system clipboard through `arboard`.
///
/// The `arboard::Clipboard` lives on its own thread for the life of the
/// backend. On X11 and Wayland the copied text is served by this process,
/// so it stays pasteable until the client exits.
#[derive(Debug)]
pub struct SystemBackend {
    requests: std_mpsc::Sender<CopyRequest>,
}

impl SystemBackend {
    /// Open the system clipboard.
    ///
    /// Blocks until the clipboard thread reports whether it connected, so
    /// call it through `spawn_blocking` from async code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Clipboard`] when no clipboard is reachable (no
    /// display server, headless session) and [`AppError::Io`] if the thread
    /// cannot be spawned.
    pub fn open() -> Result<Self> {
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let (requests, incoming) = std_mpsc::channel::<CopyRequest>();

        std::thread::Builder::new()
            .name("clipboard".into())
            .spawn(move || {
                let mut clipboard = match arboard::Clipboard::new() {
                    Ok(clipboard) => {
                        let _ = ready_tx.send(Ok(()));
                        clipboard
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                for (text, reply) in incoming {
                    let _ = reply.send(clipboard.set_text(text).map_err(|e| e.to_string()));
                }
                debug!("clipboard thread stopping");
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { requests }),
            Ok(Err(e)) => Err(AppError::Clipboard(format!("system clipboard unavailable: {e}"))),
            Err(_) => Err(AppError::Clipboard("clipboard thread exited".into())),
        }
    }
}

#[async_trait]
impl ClipboardBackend for SystemBackend {
    fn name(&self) -> &str {
        "system"
    }

    async fn copy(&self, text: &str) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.requests
            .send((text.to_owned(), reply))
            .map_err(|_| AppError::Clipboard("clipboard thread exited".into()))?;
        done.await
            .map_err(|_| AppError::Clipboard("clipboard thread exited".into()))?
            .map_err(AppError::Clipboard)
    }
}

/// OSC 52 sequence asking the terminal to set its clipboard to `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

/// Copies by writing an OSC 52 escape to the terminal.
///
/// Terminals that do not support it ignore the sequence silently, so this
/// is only used when stdout is a terminal and the system clipboard failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Osc52Backend;

#[async_trait]
impl ClipboardBackend for Osc52Backend {
    fn name(&self) -> &str {
        "osc52"
    }

    async fn copy(&self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout();
        if !stdout.is_terminal() {
            return Err(AppError::Clipboard("stdout is not a terminal".into()));
        }
        stdout.write_all(osc52_sequence(text).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// The copy chain.
pub struct Clipboard {
    primary: Option<Box<dyn ClipboardBackend>>,
    legacy: Option<Box<dyn ClipboardBackend>>,
}

impl Clipboard {
    /// Chain with explicit backends.
    pub fn new(
        primary: Option<Box<dyn ClipboardBackend>>,
        legacy: Option<Box<dyn ClipboardBackend>>,
    ) -> Self {
        Self { primary, legacy }
    }

    /// Chain for this host: the system clipboard when reachable, then OSC 52.
    pub async fn detect() -> Self {
        let primary = match tokio::task::spawn_blocking(SystemBackend::open).await {
            Ok(Ok(backend)) => {
                info!("system clipboard available");
                Some(Box::new(backend) as Box<dyn ClipboardBackend>)
            }
            Ok(Err(e)) => {
                debug!(error = %e, "no system clipboard");
                None
            }
            Err(e) => {
                warn!(error = %e, "clipboard probe panicked");
                None
            }
        };
        Self::new(primary, Some(Box::new(Osc52Backend)))
    }

    /// Copy `text`, falling through the chain.
    pub async fn copy(&self, text: &str) -> CopyOutcome {
        if let Some(primary) = &self.primary {
            match primary.copy(text).await {
                Ok(()) => return CopyOutcome::Copied,
                Err(e) => warn!(backend = primary.name(), error = %e, "clipboard copy failed"),
            }
        }
        if let Some(legacy) = &self.legacy {
            match legacy.copy(text).await {
                Ok(()) => return CopyOutcome::CopiedLegacy,
                Err(e) => {
                    warn!(backend = legacy.name(), error = %e, "legacy clipboard copy failed");
                }
            }
        }
        CopyOutcome::Manual(text.to_owned())
    }
}
