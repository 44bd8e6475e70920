//! Protocol chat panel
//!
//! Displays the protocol narration log, colored by sender.

use bb84_app::App;
use bb84_core::Sender;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the chat panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Protocol log ");

    let items: Vec<ListItem> = if app.chat().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "Press p to prepare a run",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        app.chat()
            .messages()
            .iter()
            .map(|msg| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>6}:", msg.sender.name()),
                        sender_style(msg.sender),
                    ),
                    Span::raw(" "),
                    Span::raw(msg.text.clone()),
                ]))
            })
            .collect()
    };

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn sender_style(sender: Sender) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match sender {
        Sender::Alice => style.fg(Color::Green),
        Sender::Bob => style.fg(Color::Blue),
        Sender::Eve => style.fg(Color::Red),
        Sender::System => style.fg(Color::Yellow),
    }
}
