use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::controller::{Phase, QuoteState};
use crate::types::{relative_time, QuoteTweet};

const BLUE: Color = Color::Rgb(29, 155, 240);
const MUTED: Color = Color::Rgb(113, 118, 123);

pub fn render(frame: &mut Frame, state: &QuoteState, selected: usize, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" Quote Tweets ({}) ", state.records.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ));

    if let Some(message) = placeholder(state) {
        let body = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(MUTED));
        frame.render_widget(body, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let footer = footer(state);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(footer.as_ref().map_or(0, |_| 1)),
        ])
        .split(inner);

    let width = inner.width as usize;
    let items: Vec<ListItem> = state
        .records
        .iter()
        .enumerate()
        .map(|(i, quote)| quote_item(quote, i == selected, width))
        .collect();

    let list = List::new(items).highlight_style(Style::default().bg(Color::Rgb(32, 35, 39)));
    let mut list_state = ListState::default();
    list_state.select(Some(selected.min(state.records.len().saturating_sub(1))));
    frame.render_stateful_widget(list, chunks[0], &mut list_state);

    if let Some(line) = footer {
        frame.render_widget(
            Paragraph::new(line).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

/// Message shown instead of the list, if the panel has nothing to list.
fn placeholder(state: &QuoteState) -> Option<String> {
    match state.phase {
        Phase::Idle | Phase::LoadingInitial => Some("Loading quote tweets...".to_string()),
        Phase::ErrorInitial => Some(
            state
                .error
                .clone()
                .unwrap_or_else(|| "Could not load quote tweets".to_string()),
        ),
        Phase::Ready if state.records.is_empty() => Some("No quote tweets found".to_string()),
        _ => None,
    }
}

fn footer(state: &QuoteState) -> Option<Line<'static>> {
    match state.phase {
        Phase::LoadingMore => Some(Line::from(Span::styled(
            "Loading more...",
            Style::default().fg(MUTED),
        ))),
        Phase::ErrorMore => Some(Line::from(vec![
            Span::styled(
                state.error.clone().unwrap_or_default(),
                Style::default().fg(Color::Red),
            ),
            Span::raw("  "),
            Span::styled("Retry (m)", Style::default().fg(BLUE)),
        ])),
        Phase::Ready if state.has_more => Some(Line::from(Span::styled(
            "Show more (m)",
            Style::default().fg(BLUE).add_modifier(Modifier::BOLD),
        ))),
        _ => None,
    }
}

fn quote_item(quote: &QuoteTweet, selected: bool, width: usize) -> ListItem<'static> {
    let name_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    };

    let mut header = vec![Span::styled(quote.display_name.clone(), name_style)];
    if quote.verified {
        header.push(Span::styled(" ✓", Style::default().fg(BLUE)));
    }
    header.push(Span::styled(
        format!(" @{}", quote.username),
        Style::default().fg(MUTED),
    ));
    if let Some(created_at) = &quote.created_at {
        header.push(Span::styled(
            format!(" · {}", relative_time(created_at)),
            Style::default().fg(MUTED),
        ));
    }

    let mut lines = vec![Line::from(header)];
    lines.extend(
        wrap_text(&quote.text, width.max(10))
            .into_iter()
            .map(Line::from),
    );
    lines.push(Line::from(""));
    ListItem::new(lines)
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > width {
                if !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                }
                let head: String = word.chars().take(width).collect();
                word = word.chars().skip(width).collect();
                out.push(head);
            }
            let needed =
                line.chars().count() + usize::from(!line.is_empty()) + word.chars().count();
            if needed > width && !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        if !line.is_empty() {
            out.push(line);
        }
    }
    out
}
