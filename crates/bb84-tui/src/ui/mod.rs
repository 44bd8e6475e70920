//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod chat;
mod channel;
mod parties;
mod results;
mod status;

use bb84_app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 8;
    const RESULTS_HEIGHT: u16 = 6;
    const CHAT_HEIGHT: u16 = 9;
    const STATUS_HEIGHT: u16 = 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(RESULTS_HEIGHT),
            Constraint::Length(CHAT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, results_area, chat_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, app, *main_area);
    results::render(frame, app, *results_area);
    chat::render(frame, app, *chat_area);
    status::render(frame, app, *status_area);
}

/// Render the main area (Alice | channel | Bob).
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) {
    const PARTY_WIDTH: u16 = 26;
    const CHANNEL_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(PARTY_WIDTH),
            Constraint::Min(CHANNEL_MIN_WIDTH),
            Constraint::Length(PARTY_WIDTH),
        ])
        .split(area);

    let [alice_area, channel_area, bob_area] = chunks.as_ref() else {
        return;
    };

    parties::render_alice(frame, app, *alice_area);
    channel::render(frame, app, *channel_area);
    parties::render_bob(frame, app, *bob_area);
}
