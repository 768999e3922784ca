use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone)]
pub enum Event {
    Tick,
    Render,
    Key(KeyEvent),
    /// The page host moved to a new URL.
    Navigate(String),
}

impl Event {
    /// Translate a raw terminal event. Pasting a URL counts as navigating to it.
    pub fn from_terminal(event: TermEvent) -> Option<Event> {
        match event {
            TermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            TermEvent::Paste(text) => {
                let url = text.trim();
                (!url.is_empty()).then(|| Event::Navigate(url.to_string()))
            }
            _ => None,
        }
    }

    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> TermEvent {
        TermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn ctrl_c_quits() {
        let event = Event::from_terminal(key(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        ))
        .unwrap();
        assert!(event.is_quit());
    }

    #[test]
    fn key_release_is_dropped() {
        let event = Event::from_terminal(key(
            KeyCode::Char('m'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert!(event.is_none());
    }

    #[test]
    fn paste_becomes_navigation() {
        let event = Event::from_terminal(TermEvent::Paste(
            "  https://x.com/a/status/1\n".to_string(),
        ));
        assert!(matches!(event, Some(Event::Navigate(url)) if url == "https://x.com/a/status/1"));
        assert!(Event::from_terminal(TermEvent::Paste("   ".to_string())).is_none());
    }
}
