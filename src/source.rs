use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Cursor, PostId, QuotePage};

/// A paginated source of quote tweets.
///
/// An empty page with no cursor means the source is exhausted. Failures are
/// returned as errors and never as an empty page.
#[async_trait]
pub trait QuoteSource: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn fetch_quotes(&self, post: &PostId, cursor: Option<&Cursor>) -> Result<QuotePage>;
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::sync::oneshot;

    use super::*;
    use crate::error::QuoteError;
    use crate::types::QuoteTweet;

    pub fn quote(id: &str) -> QuoteTweet {
        QuoteTweet {
            id: id.to_string(),
            username: format!("user_{}", id),
            display_name: format!("User {}", id),
            verified: false,
            avatar: String::new(),
            text: format!("quote {}", id),
            created_at: None,
        }
    }

    pub fn page(ids: &[&str], next: Option<&str>) -> QuotePage {
        QuotePage {
            records: ids.iter().map(|id| quote(id)).collect(),
            next_cursor: next.map(Cursor::new),
        }
    }

    enum Reply {
        Ready(Result<QuotePage>),
        Gated(oneshot::Receiver<Result<QuotePage>>),
    }

    /// Scripted source: replies are consumed in call order and every call is
    /// recorded as `(post, cursor)`.
    #[derive(Default)]
    pub struct ScriptedSource {
        replies: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl std::fmt::Debug for ScriptedSource {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ScriptedSource").finish_non_exhaustive()
        }
    }

    impl ScriptedSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_page(&self, page: QuotePage) {
            self.replies
                .lock()
                .unwrap()
                .push_back(Reply::Ready(Ok(page)));
        }

        pub fn push_error(&self, err: QuoteError) {
            self.replies
                .lock()
                .unwrap()
                .push_back(Reply::Ready(Err(err)));
        }

        /// Queue a reply that is held until the returned sender fires.
        pub fn push_gated(&self) -> oneshot::Sender<Result<QuotePage>> {
            let (tx, rx) = oneshot::channel();
            self.replies.lock().unwrap().push_back(Reply::Gated(rx));
            tx
        }

        pub fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QuoteSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_quotes(
            &self,
            post: &PostId,
            cursor: Option<&Cursor>,
        ) -> Result<QuotePage> {
            self.calls.lock().unwrap().push((
                post.as_str().to_string(),
                cursor.map(|c| c.as_str().to_string()),
            ));
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Ready(result)) => result,
                Some(Reply::Gated(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err(QuoteError::Transport("gate dropped".into()))),
                None => Ok(QuotePage::default()),
            }
        }
    }
}
