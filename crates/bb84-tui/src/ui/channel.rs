//! Quantum channel panel
//!
//! Shows photons currently in flight between Alice and Bob, and Eve's
//! position on the wire when she is active.

use bb84_app::App;
use bb84_core::Mode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Render the channel panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let run = app.run();
    let title = match run.mode() {
        Mode::WithEve => " Quantum channel (Eve listening) ",
        Mode::WithoutEve => " Quantum channel ",
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let mut lines = Vec::new();

    if run.mode() == Mode::WithEve {
        lines.push(Line::from(Span::styled(
            format!("  Eve intercepts with p = {:.1}", app.interception_rate()),
            Style::default().fg(Color::Red),
        )));
    }

    for photon in app.photons().photons() {
        let marker = if photon.intercepted { "⚡" } else { "→" };
        let style = if photon.intercepted {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        lines.push(Line::from(Span::styled(
            format!("  photon {} [{} {}] {marker}", photon.round + 1, photon.bit, photon.basis),
            style,
        )));
    }

    if app.photons().photons().is_empty() {
        lines.push(Line::from(Span::styled("  channel clear", Style::default().fg(Color::DarkGray))));
    }

    let intercepted = run.intercepted_rounds();
    if run.bases_revealed() && !intercepted.is_empty() {
        let hit: Vec<String> = intercepted.iter().map(|r| (r + 1).to_string()).collect();
        lines.push(Line::from(Span::styled(
            format!("  Eve touched rounds: {}", hit.join(", ")),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
