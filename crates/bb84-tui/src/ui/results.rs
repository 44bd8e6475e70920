//! Results panel
//!
//! Sifted indices, the shared key, the error rate, and the security
//! verdict once the run is complete.

use bb84_app::App;
use bb84_core::Step;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Render the results panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Results ");
    let run = app.run();

    let mut lines = Vec::new();

    if run.bases_revealed() {
        let positions: Vec<String> =
            run.matching_indices().iter().map(|i| (i + 1).to_string()).collect();
        lines.push(Line::from(vec![
            Span::raw("Matching bases: "),
            Span::styled(
                format!("{} of {}", positions.len(), run.total_rounds()),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("  (rounds {})", positions.join(", ")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            "Bases not compared yet",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if run.step() == Step::Complete {
        match run.shared_key() {
            Some(key) => lines.push(Line::from(vec![
                Span::raw("Shared key: "),
                Span::styled(
                    key.to_string(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
            ])),
            None => lines.push(Line::from(Span::styled(
                "Key discarded - error rate too high",
                Style::default().fg(Color::Red),
            ))),
        }

        lines.push(Line::from(format!("Error rate: {:.1}%", run.error_rate() * 100.0)));

        let verdict = if run.is_secure() {
            Span::styled(
                "SECURE - no eavesdropping detected",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "COMPROMISED - possible eavesdropping",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        };
        lines.push(Line::from(verdict));
    }

    if let Some(path) = app.circuit_path() {
        lines.push(Line::from(Span::styled(
            format!("Circuit: {path}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
