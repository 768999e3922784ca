use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::DEFAULT_ANCHOR;

/// The main column of the terminal page.
pub const MAIN_REGION: &str = "main";
/// The sidebar of the terminal page, addressed the way the web page labels it.
pub const SIDEBAR_REGION: &str = DEFAULT_ANCHOR;

/// A located mount point in the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub selector: String,
}

/// Releases a mounted fragment when dropped or explicitly released.
/// The disposer runs exactly once.
pub struct MountGuard {
    dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl MountGuard {
    pub fn new(dispose: impl FnOnce() + Send + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    pub fn release(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for MountGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountGuard")
            .field("mounted", &self.dispose.is_some())
            .finish()
    }
}

/// What the widget lifecycle needs from the page it lives in.
pub trait PageHost {
    fn find_anchor(&self, selector: &str) -> Option<Anchor>;
    fn mount(&mut self, anchor: &Anchor) -> MountGuard;
}

/// The terminal page: a fixed set of named regions, at most one of which
/// hosts the quote panel at a time.
#[derive(Debug, Clone)]
pub struct TerminalHost {
    regions: Vec<String>,
    slot: Arc<Mutex<Option<(u64, Anchor)>>>,
    next_mount: u64,
}

impl Default for TerminalHost {
    fn default() -> Self {
        Self::new([MAIN_REGION, SIDEBAR_REGION])
    }
}

impl TerminalHost {
    pub fn new<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
            slot: Arc::new(Mutex::new(None)),
            next_mount: 0,
        }
    }

    /// Region currently hosting the panel, if any.
    pub fn mounted_region(&self) -> Option<String> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|(_, anchor)| anchor.selector.clone()))
    }
}

impl PageHost for TerminalHost {
    fn find_anchor(&self, selector: &str) -> Option<Anchor> {
        self.regions
            .iter()
            .find(|r| r.as_str() == selector.trim())
            .map(|r| Anchor {
                selector: r.clone(),
            })
    }

    fn mount(&mut self, anchor: &Anchor) -> MountGuard {
        self.next_mount += 1;
        let ticket = self.next_mount;
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some((ticket, anchor.clone()));
        }
        debug!(region = %anchor.selector, ticket, "mounted quote panel");

        let slot = Arc::clone(&self.slot);
        MountGuard::new(move || {
            if let Ok(mut slot) = slot.lock() {
                // A newer mount owns the slot; leave it alone
                if matches!(slot.as_ref(), Some((t, _)) if *t == ticket) {
                    *slot = None;
                }
            }
            debug!(ticket, "unmounted quote panel");
        })
    }
}
