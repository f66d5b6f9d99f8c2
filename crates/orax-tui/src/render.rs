//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState` by immutable reference, draw to a
//! ratatui Frame, and never mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::state::{AppState, Panel};

/// Height of the status line at the bottom.
const STATUS_HEIGHT: u16 = 1;

/// Height of the price panel (borders + two price lines + hint).
const PRICE_HEIGHT: u16 = 5;

/// Height of the knowledge panel (borders + input + answer).
const KNOWLEDGE_HEIGHT: u16 = 4;

/// Spinner frames for status line animation.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(PRICE_HEIGHT),
            Constraint::Length(KNOWLEDGE_HEIGHT),
            Constraint::Min(4),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_price_panel(app, frame, chunks[0]);
    render_knowledge_panel(app, frame, chunks[1]);
    render_chat_panel(app, frame, chunks[2]);
    render_status_line(app, frame, chunks[3]);
}

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

fn render_price_panel(app: &AppState, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Panel::Price;
    let hint = if app.price.refreshing {
        "Refreshing..."
    } else if focused {
        "Enter to refresh"
    } else {
        ""
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Diesel: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(app.price.diesel.as_str()),
        ]),
        Line::from(vec![
            Span::styled("LPG:    ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(app.price.lpg.as_str()),
        ]),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];
    let panel = Paragraph::new(lines).block(panel_block("Fuel prices", focused));
    frame.render_widget(panel, area);
}

fn render_knowledge_panel(app: &AppState, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Panel::Knowledge;
    let lines = vec![
        input_line(&app.knowledge.input, focused),
        Line::from(Span::raw(app.knowledge.answer.as_str())),
    ];
    let panel = Paragraph::new(lines).block(panel_block("Knowledge oracle", focused));
    frame.render_widget(panel, area);
}

fn render_chat_panel(app: &AppState, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Panel::Chat;
    let mut lines = vec![
        input_line(&app.chat.input, focused),
        Line::from(Span::styled(
            app.chat.submit_label(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];
    // Newest exchange first; older ones scroll off the bottom.
    for exchange in &app.chat.history {
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", exchange.at.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("You: {}", exchange.question),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(Span::raw(format!("Bot: {}", exchange.answer))));
    }
    let panel = Paragraph::new(lines).block(panel_block("Chat", focused));
    frame.render_widget(panel, area);
}

fn render_status_line(app: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    if app.is_busy() {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!("{spinner} "),
            Style::default().fg(Color::Cyan),
        ));
    }
    spans.push(Span::raw(app.status.as_str()));
    spans.push(Span::styled(
        format!("  |  account {}  |  Tab: switch panel, Esc: quit", app.account),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// An input field line with a trailing cursor marker when focused.
fn input_line(input: &str, focused: bool) -> Line<'static> {
    let mut spans = vec![
        Span::styled("> ", Style::default().fg(Color::Cyan)),
        Span::raw(input.to_string()),
    ];
    if focused {
        spans.push(Span::styled(
            "█",
            Style::default().add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    Line::from(spans)
}
