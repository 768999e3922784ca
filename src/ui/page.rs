use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::mount::Navigation;

/// The host page itself: what post is being viewed, or why nothing is.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Page ");

    let lines = match app.mounts.active() {
        Some(widget) => vec![
            Line::from(vec![
                Span::styled(
                    format!("@{}", widget.post.author),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" posted "),
                Span::styled(
                    widget.post.id.to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("Quote tweets are shown in {}", widget.anchor.selector),
                Style::default().fg(Color::Gray),
            )),
        ],
        None => vec![Line::from(Span::styled(
            idle_message(app.last_navigation),
            Style::default().fg(Color::Gray),
        ))],
    };

    let page = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(page, area);
}

fn idle_message(nav: Option<Navigation>) -> &'static str {
    match nav {
        None => "Nothing loaded yet.",
        Some(Navigation::AnchorMissing) => {
            "This page has no place for the quote panel (check page.anchor in the config)."
        }
        Some(_) => "Not a post page. Quote tweets appear on x.com/<user>/status/<id> pages.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_message_explains_missing_anchor() {
        assert!(idle_message(Some(Navigation::AnchorMissing)).contains("page.anchor"));
        assert!(idle_message(Some(Navigation::Ignored)).starts_with("Not a post page"));
        assert_eq!(idle_message(None), "Nothing loaded yet.");
    }
}
