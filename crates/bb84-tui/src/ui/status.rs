//! Status bar
//!
//! Step, mode, pacing, backend health, and the key bindings.

use bb84_app::{App, BackendHealth};
use bb84_core::Mode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let run = app.run();

    let health_style = match app.backend_health() {
        BackendHealth::Healthy => Style::default().fg(Color::Green),
        BackendHealth::Unreachable => Style::default().fg(Color::Red),
        BackendHealth::Unknown => Style::default().fg(Color::Yellow),
    };

    let mode = match run.mode() {
        Mode::WithEve => "with Eve",
        Mode::WithoutEve => "no Eve",
    };

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!("[{}]", run.step().label()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " {mode} | rounds: {} | rate: {:.1} | speed: {}",
            run.total_rounds(),
            app.interception_rate(),
            run.speed().label(),
        )),
        Span::raw(" | backend: "),
        Span::styled(app.backend_health().label(), health_style),
    ];

    if app.is_busy() {
        spans.push(Span::styled(" | working...", Style::default().fg(Color::Yellow)));
    }
    if let Some(message) = app.status_message() {
        spans.push(Span::styled(format!(" | {message}"), Style::default().fg(Color::Red)));
    }

    let help = Line::from(Span::styled(
        " p prepare | s send | c compare | g key | v circuit | m mode | space skip | \
         +/- rounds | arrows rate/speed | r reset | q quit",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(vec![Line::from(spans), help]);
    frame.render_widget(paragraph, area);
}
