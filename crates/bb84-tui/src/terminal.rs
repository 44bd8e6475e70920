//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Remote protocol calls go
//! through [`Bb84Api`].

use std::{
    io::{self, Stdout, stdout},
    time::Duration,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use bb84_app::{App, AppEvent, Driver, KeyInput};
use bb84_client::{ApiError, Bb84Api, types::FinalKeyResponse};
use bb84_core::{Basis, Bit, Qubit};
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::ui;

/// How long `poll_event` waits before reporting a tick.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Backend client could not be constructed.
    #[error("client error: {0}")]
    Client(#[from] ApiError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and remote
/// protocol calls (reqwest via [`Bb84Api`]).
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    api: Bb84Api,
}

impl TerminalDriver {
    /// Create a new terminal driver talking to `server`.
    pub fn new(server: &str) -> Result<Self, TerminalError> {
        let api = Bb84Api::new(server)?;

        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, api })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            _ => None,
        }
    }

    /// Convert a crossterm event to an application event.
    fn convert_event(event: Event) -> Option<AppEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Self::convert_key(key.code).map(AppEvent::Key)
            },
            Event::Resize(cols, rows) => Some(AppEvent::Resize(cols, rows)),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        tokio::select! {
            biased;

            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(event)) => Ok(Self::convert_event(event)),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    // Input stream is gone for good; shut down instead of
                    // spinning on an always-ready None.
                    None => Ok(Some(AppEvent::Key(KeyInput::Esc))),
                }
            }

            () = tokio::time::sleep(TICK_INTERVAL) => {
                Ok(Some(AppEvent::Tick))
            }
        }
    }

    async fn pace(&mut self, delay: Duration) -> Vec<AppEvent> {
        let deadline = tokio::time::Instant::now() + delay;
        let mut events = Vec::new();

        loop {
            tokio::select! {
                maybe_event = self.event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            if let Some(app_event) = Self::convert_event(event) {
                                events.push(app_event);
                            }
                        },
                        Some(Err(e)) => tracing::warn!("input error during pacing: {e}"),
                        None => {
                            events.push(AppEvent::Key(KeyInput::Esc));
                            break;
                        },
                    }
                }

                () = tokio::time::sleep_until(deadline) => break,
            }
        }

        events
    }

    async fn reset_backend(&mut self) -> Result<(), ApiError> {
        self.api.reset().await
    }

    async fn send_qubit(&mut self, qubit: &Qubit) -> Result<(), ApiError> {
        self.api.send_qubit(qubit).await
    }

    async fn eve_intercept(&mut self, round: usize) -> Result<(), ApiError> {
        self.api.eve_intercept(round).await
    }

    async fn bob_measure(&mut self, round: usize, basis: Basis) -> Result<Bit, ApiError> {
        let response = self.api.bob_measure(round, basis).await?;
        Ok(response.bob_result.measured)
    }

    async fn compare_bases(&mut self) -> Result<Vec<usize>, ApiError> {
        let response = self.api.compare_bases().await?;
        Ok(response.matching_indices)
    }

    async fn final_key(&mut self) -> Result<FinalKeyResponse, ApiError> {
        self.api.final_key().await
    }

    async fn fetch_overall_circuit(&mut self, eve: bool) -> Result<String, ApiError> {
        let rendering = self.api.overall_circuit(eve).await?;
        let bytes = STANDARD
            .decode(rendering.img_base64.as_bytes())
            .map_err(|e| ApiError::Decode(format!("invalid circuit rendering: {e}")))?;

        let path = "bb84-circuit.png".to_string();
        std::fs::write(&path, bytes)
            .map_err(|e| ApiError::Decode(format!("could not store circuit rendering: {e}")))?;
        tracing::debug!(%path, "stored circuit rendering");
        Ok(path)
    }

    async fn health(&mut self) -> bool {
        self.api.health().await
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, app);
        })?;
        Ok(())
    }

    fn stop(&mut self) {}
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
