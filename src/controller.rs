//! Pagination controller for the quote panel.
//!
//! One controller owns the accumulated quotes, the continuation cursor, and
//! the fetch phase for the post it is bound to. Fetches run as spawned tasks
//! and report back through the action channel as [`FetchOutcome`]s, which the
//! event loop hands to [`QuoteController::complete`]. Each `bind` allocates a
//! fresh [`BindingId`]; outcomes carrying any other binding are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::error::Result;
use crate::source::QuoteSource;
use crate::types::{Cursor, PostId, QuotePage, QuoteTweet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    LoadingInitial,
    Ready,
    LoadingMore,
    ErrorInitial,
    ErrorMore,
}

/// Identity of one `bind` call. Unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

impl BindingId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        BindingId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Result of one fetch, tagged with the binding that issued it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub binding: BindingId,
    pub result: Result<QuotePage>,
}

/// Immutable view of the controller handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuoteState {
    pub post: Option<PostId>,
    pub records: Arc<Vec<QuoteTweet>>,
    pub phase: Phase,
    pub has_more: bool,
    pub error: Option<String>,
}

pub struct QuoteController {
    source: Arc<dyn QuoteSource>,
    action_tx: mpsc::UnboundedSender<Action>,
    post: Option<PostId>,
    binding: Option<BindingId>,
    records: Arc<Vec<QuoteTweet>>,
    cursor: Option<Cursor>,
    phase: Phase,
    error: Option<String>,
    state_tx: watch::Sender<QuoteState>,
}

impl std::fmt::Debug for QuoteController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteController")
            .field("post", &self.post)
            .field("phase", &self.phase)
            .field("records", &self.records.len())
            .field("has_more", &self.cursor.is_some())
            .finish_non_exhaustive()
    }
}

impl QuoteController {
    pub fn new(source: Arc<dyn QuoteSource>, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        let (state_tx, _) = watch::channel(QuoteState::default());
        Self {
            source,
            action_tx,
            post: None,
            binding: None,
            records: Arc::new(Vec::new()),
            cursor: None,
            phase: Phase::Idle,
            error: None,
            state_tx,
        }
    }

    /// Discard everything held for the previous post and start loading `post`.
    pub fn bind(&mut self, post: PostId) {
        let binding = BindingId::next();
        info!(post = %post, source = self.source.name(), "binding quote controller");

        self.binding = Some(binding);
        self.post = Some(post.clone());
        self.records = Arc::new(Vec::new());
        self.cursor = None;
        self.error = None;
        self.phase = Phase::LoadingInitial;
        self.publish();

        self.spawn_fetch(binding, post, None);
    }

    /// Request the next page. Returns whether a fetch was issued.
    ///
    /// Only `Ready` with a cursor and `ErrorMore` (retry with the retained
    /// cursor) can advance.
    pub fn advance(&mut self) -> bool {
        let can_advance = match self.phase {
            Phase::Ready => self.cursor.is_some(),
            Phase::ErrorMore => true,
            _ => false,
        };
        if !can_advance {
            debug!(phase = ?self.phase, "advance ignored");
            return false;
        }

        let (Some(binding), Some(post), Some(cursor)) =
            (self.binding, self.post.clone(), self.cursor.clone())
        else {
            return false;
        };

        self.phase = Phase::LoadingMore;
        self.error = None;
        self.publish();

        self.spawn_fetch(binding, post, Some(cursor));
        true
    }

    /// Apply a finished fetch. Returns whether the state changed.
    pub fn complete(&mut self, outcome: FetchOutcome) -> bool {
        if self.binding != Some(outcome.binding) {
            debug!(binding = ?outcome.binding, "dropping stale quote page");
            return false;
        }

        match (self.phase, outcome.result) {
            (Phase::LoadingInitial, Ok(page)) => {
                debug!(count = page.records.len(), "initial quote page loaded");
                self.records = Arc::new(page.records);
                self.cursor = page.next_cursor;
                self.phase = Phase::Ready;
            }
            (Phase::LoadingInitial, Err(e)) => {
                warn!("initial quote fetch failed: {}", e);
                self.error = Some(format!("Could not load quote tweets: {}", e.short_cause()));
                self.phase = Phase::ErrorInitial;
            }
            (Phase::LoadingMore, Ok(page)) => {
                debug!(count = page.records.len(), "next quote page loaded");
                Arc::make_mut(&mut self.records).extend(page.records);
                self.cursor = page.next_cursor;
                self.phase = Phase::Ready;
            }
            (Phase::LoadingMore, Err(e)) => {
                // cursor is kept so advance() retries the same page
                warn!("follow-up quote fetch failed: {}", e);
                self.error = Some(format!(
                    "Could not load more quote tweets: {}",
                    e.short_cause()
                ));
                self.phase = Phase::ErrorMore;
            }
            (phase, _) => {
                debug!(?phase, "no fetch in flight, dropping quote page");
                return false;
            }
        }

        self.publish();
        true
    }

    pub fn current_state(&self) -> QuoteState {
        QuoteState {
            post: self.post.clone(),
            records: Arc::clone(&self.records),
            phase: self.phase,
            has_more: self.cursor.is_some(),
            error: self.error.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QuoteState> {
        self.state_tx.subscribe()
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.current_state());
    }

    fn spawn_fetch(&self, binding: BindingId, post: PostId, cursor: Option<Cursor>) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let result = source.fetch_quotes(&post, cursor.as_ref()).await;
            tx.send(Action::QuotesFetched(FetchOutcome { binding, result }))
                .ok();
        });
    }
}
