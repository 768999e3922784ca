use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::action::Action;
use crate::config::Config;
use crate::controller::QuoteState;
use crate::event::Event;
use crate::host::TerminalHost;
use crate::mount::{MountManager, Navigation};
use crate::source::QuoteSource;
use crate::types::QuoteTweet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Address,
}

pub struct App {
    pub mode: InputMode,
    /// URL of the page currently shown.
    pub address: String,
    /// Address bar contents while editing.
    pub address_input: String,
    pub last_navigation: Option<Navigation>,
    pub selected: usize,
    pub status: Option<String>,
    pub error: Option<String>,
    pub should_quit: bool,
    pub mounts: MountManager<TerminalHost>,
    panel: Option<watch::Receiver<QuoteState>>,
}

impl App {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        config: &Config,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            mode: InputMode::default(),
            address: String::new(),
            address_input: String::new(),
            last_navigation: None,
            selected: 0,
            status: None,
            error: None,
            should_quit: false,
            mounts: MountManager::new(
                TerminalHost::default(),
                config.page.anchor.clone(),
                source,
                action_tx,
            ),
            panel: None,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Navigate(url) => Action::Navigate(url),
            Event::Key(key) => self.handle_key(key),
            Event::Tick | Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if self.mode == InputMode::Address {
            return match key.code {
                KeyCode::Enter => Action::AddressConfirm,
                KeyCode::Esc => Action::AddressCancel,
                KeyCode::Backspace => Action::AddressBackspace,
                KeyCode::Char(c) => Action::AddressInput(c),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('g') | KeyCode::Char(':') => Action::EditAddress,
            KeyCode::Char('j') | KeyCode::Down => Action::SelectNext,
            KeyCode::Char('k') | KeyCode::Up => Action::SelectPrev,
            KeyCode::Char('m') | KeyCode::Enter => Action::ShowMore,
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Char('o') => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(action, Action::None | Action::QuotesFetched(_)) {
            self.status = None;
            self.error = None;
        }

        match action {
            Action::Quit => {
                self.mounts.teardown();
                self.panel = None;
                self.should_quit = true;
            }
            Action::Navigate(url) => self.navigate(url),

            Action::EditAddress => {
                self.address_input = self.address.clone();
                self.mode = InputMode::Address;
            }
            Action::AddressInput(c) => self.address_input.push(c),
            Action::AddressBackspace => {
                self.address_input.pop();
            }
            Action::AddressConfirm => {
                self.mode = InputMode::Normal;
                let url = std::mem::take(&mut self.address_input);
                self.navigate(url.trim().to_string());
            }
            Action::AddressCancel => {
                self.mode = InputMode::Normal;
                self.address_input.clear();
            }

            Action::SelectNext => {
                let len = self.quote_count();
                if len > 0 && self.selected < len - 1 {
                    self.selected += 1;
                }
            }
            Action::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
            }
            Action::ShowMore => {
                if !self.mounts.show_more() {
                    debug!("show more ignored");
                }
            }
            Action::Reload => {
                if self.mounts.reload() {
                    self.selected = 0;
                }
            }
            Action::OpenInBrowser => {
                if let Some(url) = self.selected_quote().map(|q| q.web_url()) {
                    if let Err(e) = open::that(&url) {
                        self.error = Some(format!("Could not open browser: {}", e));
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_quote().map(|q| q.web_url()) {
                    match arboard::Clipboard::new().and_then(|mut c| c.set_text(url)) {
                        Ok(()) => self.status = Some("Copied link to clipboard".to_string()),
                        Err(e) => self.error = Some(format!("Clipboard error: {}", e)),
                    }
                }
            }

            Action::QuotesFetched(outcome) => {
                self.mounts.dispatch(outcome);
            }
            Action::None => {}
        }
    }

    fn navigate(&mut self, url: String) {
        let nav = self.mounts.on_navigate(&url);
        debug!(?nav, url = %url, "navigated");
        if nav != Navigation::Unchanged {
            self.selected = 0;
        }
        self.address = url;
        self.last_navigation = Some(nav);
        // A replaced or removed widget takes its subscription with it
        if nav != Navigation::Unchanged {
            self.panel = self
                .mounts
                .active()
                .map(|widget| widget.controller.subscribe());
        }
    }

    /// Snapshot of the mounted panel, if a post page is shown.
    pub fn quote_state(&self) -> Option<QuoteState> {
        self.panel.as_ref().map(|rx| rx.borrow().clone())
    }

    fn quote_count(&self) -> usize {
        self.quote_state().map_or(0, |s| s.records.len())
    }

    fn selected_quote(&self) -> Option<QuoteTweet> {
        self.quote_state()
            .and_then(|s| s.records.get(self.selected).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    use crate::controller::Phase;
    use crate::source::testing::{page, ScriptedSource};

    fn app_with(source: &Arc<ScriptedSource>) -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = Config {
            page: crate::config::PageConfig {
                anchor: crate::host::MAIN_REGION.to_string(),
            },
            ..Config::default()
        };
        let dyn_source: Arc<dyn QuoteSource> = source.clone();
        (App::new(dyn_source, &config, tx), rx)
    }

    fn press(app: &App, code: KeyCode) -> Action {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    async fn pump(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Action>) {
        let action = rx.recv().await.expect("action channel closed");
        app.update(action);
    }

    #[tokio::test]
    async fn typing_an_address_navigates() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(page(&["a", "b"], Some("c")));
        let (mut app, mut rx) = app_with(&source);

        let action = press(&app, KeyCode::Char('g'));
        app.update(action);
        assert_eq!(app.mode, InputMode::Address);

        for c in "https://x.com/a/status/1".chars() {
            let action = press(&app, KeyCode::Char(c));
            app.update(action);
        }
        let action = press(&app, KeyCode::Enter);
        app.update(action);

        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(app.address, "https://x.com/a/status/1");
        assert_eq!(app.last_navigation, Some(Navigation::Mounted));
        assert_eq!(
            app.mounts.host().mounted_region().as_deref(),
            Some(crate::host::MAIN_REGION)
        );

        pump(&mut app, &mut rx).await;
        let state = app.quote_state().unwrap();
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.records.len(), 2);
    }

    #[tokio::test]
    async fn keys_in_address_mode_edit_instead_of_acting() {
        let source = Arc::new(ScriptedSource::new());
        let (mut app, _rx) = app_with(&source);

        app.update(Action::EditAddress);
        assert!(matches!(press(&app, KeyCode::Char('q')), Action::AddressInput('q')));
        assert!(matches!(press(&app, KeyCode::Esc), Action::AddressCancel));

        app.update(Action::AddressInput('x'));
        app.update(Action::AddressBackspace);
        app.update(Action::AddressCancel);
        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.address_input.is_empty());
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn show_more_and_selection() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(page(&["a", "b"], Some("c")));
        source.push_page(page(&["c"], None));
        let (mut app, mut rx) = app_with(&source);

        app.update(Action::Navigate("https://x.com/a/status/1".into()));
        pump(&mut app, &mut rx).await;

        app.update(Action::SelectNext);
        app.update(Action::SelectNext);
        assert_eq!(app.selected, 1);

        app.update(press(&app, KeyCode::Char('m')));
        assert_eq!(app.quote_state().unwrap().phase, Phase::LoadingMore);
        pump(&mut app, &mut rx).await;

        app.update(Action::SelectNext);
        assert_eq!(app.selected, 2);
        assert_eq!(app.selected_quote().unwrap().id, "c");
        assert!(!app.quote_state().unwrap().has_more);
    }

    #[tokio::test]
    async fn leaving_post_page_unmounts_panel() {
        let source = Arc::new(ScriptedSource::new());
        let (mut app, _rx) = app_with(&source);

        app.update(Action::Navigate("https://x.com/a/status/1".into()));
        assert!(app.quote_state().is_some());

        app.update(Action::Navigate("https://x.com/home".into()));
        assert_eq!(app.last_navigation, Some(Navigation::TornDown));
        assert!(app.quote_state().is_none());
        assert_eq!(app.mounts.host().mounted_region(), None);
    }

    #[tokio::test]
    async fn quit_tears_down() {
        let source = Arc::new(ScriptedSource::new());
        let (mut app, _rx) = app_with(&source);

        app.update(Action::Navigate("https://x.com/a/status/1".into()));
        app.update(press(&app, KeyCode::Char('q')));
        assert!(app.should_quit);
        assert!(app.mounts.active().is_none());
    }

    #[tokio::test]
    async fn panel_snapshot_follows_controller() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(page(&["a"], None));
        let (mut app, mut rx) = app_with(&source);
        assert!(app.quote_state().is_none());

        app.update(Action::Navigate("https://x.com/a/status/1".into()));
        assert_eq!(app.quote_state().unwrap().phase, Phase::LoadingInitial);

        pump(&mut app, &mut rx).await;
        let shown = app.quote_state().unwrap();
        let live = app.mounts.active().unwrap().controller.current_state();
        assert_eq!(shown, live);
    }

    #[tokio::test]
    async fn reload_restarts_from_first_page() {
        let source = Arc::new(ScriptedSource::new());
        source.push_page(page(&["a", "b"], Some("c")));
        source.push_page(page(&["z"], None));
        let (mut app, mut rx) = app_with(&source);

        app.update(Action::Navigate("https://x.com/a/status/1".into()));
        pump(&mut app, &mut rx).await;
        app.update(Action::SelectNext);

        app.update(press(&app, KeyCode::Char('r')));
        assert_eq!(app.selected, 0);
        assert_eq!(app.quote_state().unwrap().phase, Phase::LoadingInitial);

        pump(&mut app, &mut rx).await;
        let ids: Vec<String> = app
            .quote_state()
            .unwrap()
            .records
            .iter()
            .map(|q| q.id.clone())
            .collect();
        assert_eq!(ids, vec!["z"]);
    }
}
