use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::controller::{FetchOutcome, QuoteController};
use crate::host::{Anchor, MountGuard, PageHost};
use crate::source::QuoteSource;
use crate::types::PostRef;
use crate::url_match::match_post_url;

/// What a navigation event did to the mounted widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// A new widget was mounted for a different post.
    Mounted,
    /// Same post as before; nothing changed.
    Unchanged,
    /// Left a post page; the widget was removed.
    TornDown,
    /// Not a post page and nothing was mounted.
    Ignored,
    /// A post page, but the host has no anchor to mount into.
    AnchorMissing,
}

/// The mounted quote panel: the post it shows, its controller, and the
/// guard that unmounts it.
#[derive(Debug)]
pub struct ActiveWidget {
    pub post: PostRef,
    pub anchor: Anchor,
    pub controller: QuoteController,
    guard: MountGuard,
}

impl ActiveWidget {
    fn release(self) {
        self.guard.release();
    }
}

/// Owns the single active widget and is the only thing that replaces it.
pub struct MountManager<H: PageHost> {
    host: H,
    anchor: String,
    source: Arc<dyn QuoteSource>,
    action_tx: mpsc::UnboundedSender<Action>,
    active: Option<ActiveWidget>,
}

impl<H: PageHost> MountManager<H> {
    pub fn new(
        host: H,
        anchor: impl Into<String>,
        source: Arc<dyn QuoteSource>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            host,
            anchor: anchor.into(),
            source,
            action_tx,
            active: None,
        }
    }

    pub fn on_navigate(&mut self, url: &str) -> Navigation {
        let Some(post) = match_post_url(url) else {
            debug!(url, "not a post page");
            return if self.teardown() {
                Navigation::TornDown
            } else {
                Navigation::Ignored
            };
        };

        if self
            .active
            .as_ref()
            .is_some_and(|widget| widget.post.id == post.id)
        {
            return Navigation::Unchanged;
        }

        self.teardown();

        let Some(anchor) = self.host.find_anchor(&self.anchor) else {
            warn!(anchor = %self.anchor, "mount anchor not found, quote panel not shown");
            return Navigation::AnchorMissing;
        };

        let guard = self.host.mount(&anchor);
        let mut controller = QuoteController::new(Arc::clone(&self.source), self.action_tx.clone());
        controller.bind(post.id.clone());
        info!(post = %post.id, author = %post.author, "mounted quote panel");

        self.active = Some(ActiveWidget {
            post,
            anchor,
            controller,
            guard,
        });
        Navigation::Mounted
    }

    /// Unmount the active widget. Returns whether one was mounted.
    pub fn teardown(&mut self) -> bool {
        match self.active.take() {
            Some(widget) => {
                info!(post = %widget.post.id, "tearing down quote panel");
                widget.release();
                true
            }
            None => false,
        }
    }

    /// Route a finished fetch to the active controller.
    pub fn dispatch(&mut self, outcome: FetchOutcome) -> bool {
        match self.active.as_mut() {
            Some(widget) => widget.controller.complete(outcome),
            None => {
                debug!("no active quote panel, dropping fetch outcome");
                false
            }
        }
    }

    /// "Show more" on the active widget.
    pub fn show_more(&mut self) -> bool {
        self.active
            .as_mut()
            .is_some_and(|widget| widget.controller.advance())
    }

    /// Reload the active post from its first page.
    pub fn reload(&mut self) -> bool {
        match self.active.as_mut() {
            Some(widget) => {
                let id = widget.post.id.clone();
                widget.controller.bind(id);
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> Option<&ActiveWidget> {
        self.active.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: PageHost> Drop for MountManager<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
