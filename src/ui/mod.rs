mod page;
mod quote_panel;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, InputMode};
use crate::host::{MAIN_REGION, SIDEBAR_REGION};

const SIDEBAR_WIDTH: u16 = 52;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_address_bar(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
        .split(chunks[1]);

    let mounted = app.mounts.host().mounted_region();
    let state = app.quote_state();

    match (mounted.as_deref(), state) {
        (Some(MAIN_REGION), Some(state)) => {
            quote_panel::render(frame, &state, app.selected, body[0]);
            render_empty_sidebar(frame, body[1]);
        }
        (Some(SIDEBAR_REGION), Some(state)) => {
            page::render(frame, app, body[0]);
            quote_panel::render(frame, &state, app.selected, body[1]);
        }
        _ => {
            page::render(frame, app, body[0]);
            render_empty_sidebar(frame, body[1]);
        }
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_address_bar(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.mode == InputMode::Address;
    let (text, style) = if editing {
        (
            format!("{}_", app.address_input),
            Style::default().fg(Color::Yellow),
        )
    } else if app.address.is_empty() {
        (
            "press g to enter a URL, or paste one".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (app.address.clone(), Style::default().fg(Color::White))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " quotebox ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    frame.render_widget(Paragraph::new(Span::styled(text, style)).block(block), area);
}

fn render_empty_sidebar(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Relevant people ");
    frame.render_widget(block, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(status) = &app.status {
        Line::from(vec![Span::styled(
            status.clone(),
            Style::default().fg(Color::Green),
        )])
    } else {
        let help = match app.mode {
            InputMode::Address => "Enter: go | Esc: cancel",
            InputMode::Normal => {
                "g: address | j/k: select | m: show more | r: reload | o: open | y: yank | q: quit"
            }
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
