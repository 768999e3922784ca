use chrono::{DateTime, Utc};
use std::fmt;

/// Identifier of the post whose quotes are being browsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A matched post page: the author handle from the path plus the post id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    pub author: String,
    pub id: PostId,
}

/// Opaque continuation token. Only ever handed back to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One quote tweet, normalized for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteTweet {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub verified: bool,
    pub avatar: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl QuoteTweet {
    pub fn web_url(&self) -> String {
        format!("https://x.com/{}/status/{}", self.username, self.id)
    }
}

/// One page of quotes as returned by a [`crate::source::QuoteSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotePage {
    pub records: Vec<QuoteTweet>,
    pub next_cursor: Option<Cursor>,
}

/// Format a timestamp relative to now: "5m", "3h", "2d", or a date.
pub fn relative_time(dt: &DateTime<Utc>) -> String {
    relative_to(dt, Utc::now())
}

fn relative_to(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(*dt).num_seconds().max(0);
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        86_400..=604_799 => format!("{}d", secs / 86_400),
        _ => dt.format("%b %-d, %Y").to_string(),
    }
}
