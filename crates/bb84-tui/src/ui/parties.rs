//! Alice and Bob panels
//!
//! One row per round: the bit and the basis on Alice's side, the basis and
//! the measured bit on Bob's. Basis agreement is only colored in once the
//! bases have been publicly revealed.

use bb84_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render Alice's panel.
pub fn render_alice(frame: &mut Frame, app: &App, area: Rect) {
    let run = app.run();
    let items: Vec<ListItem> = run
        .alice_qubits()
        .iter()
        .enumerate()
        .map(|(round, qubit)| {
            let row = format!("q{:<2} bit {}  basis {}", round + 1, qubit.bit, qubit.basis);
            ListItem::new(Line::from(Span::styled(row, round_style(app, round))))
        })
        .collect();

    render_party(frame, area, " Alice ", items, run.alice_qubits().len());
}

/// Render Bob's panel.
pub fn render_bob(frame: &mut Frame, app: &App, area: Rect) {
    let run = app.run();
    let items: Vec<ListItem> = run
        .bob_bases()
        .iter()
        .enumerate()
        .map(|(round, basis)| {
            let measured = run
                .bob_measurements()
                .get(round)
                .copied()
                .flatten()
                .map_or_else(|| "?".to_string(), |bit| bit.to_string());
            let row = format!("q{:<2} basis {basis}  got {measured}", round + 1);
            ListItem::new(Line::from(Span::styled(row, round_style(app, round))))
        })
        .collect();

    render_party(frame, area, " Bob ", items, run.bob_bases().len());
}

fn render_party(frame: &mut Frame, area: Rect, title: &str, items: Vec<ListItem>, len: usize) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());

    let items = if len == 0 {
        vec![ListItem::new(Line::from(Span::styled(
            "press p to prepare",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        items
    };

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

/// Row style for one round.
///
/// Before the public comparison every row is neutral; coloring by basis
/// agreement earlier would leak information neither party has yet.
fn round_style(app: &App, round: usize) -> Style {
    let run = app.run();
    match run.basis_match(round) {
        Some(true) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Some(false) => Style::default().fg(Color::DarkGray),
        None if run.current_round() == round => {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        },
        None => Style::default(),
    }
}
