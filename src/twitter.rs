use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::{QuoteError, Result};
use crate::source::QuoteSource;
use crate::types::{Cursor, PostId, QuotePage, QuoteTweet};

const TWEET_FIELDS: &str = "author_id,created_at,text";
const USER_FIELDS: &str = "name,username,verified,profile_image_url";

pub const UNKNOWN_USERNAME: &str = "unknown";
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// Client for the X API v2 `quote_tweets` endpoint.
pub struct TwitterApi {
    client: Client,
    base_url: String,
    token: String,
    page_size: u32,
}

impl std::fmt::Debug for TwitterApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterApi")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl TwitterApi {
    pub fn new(config: &ApiConfig, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(concat!("quotebox/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QuoteError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            page_size: config.clamped_page_size(),
        })
    }

    fn quotes_url(&self, post: &PostId) -> String {
        format!(
            "{}/2/tweets/{}/quote_tweets",
            self.base_url,
            urlencoding::encode(post.as_str())
        )
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable body only loses diagnostics
            let body = response.text().await.unwrap_or_default();
            warn!("quote_tweets request failed with status {}", status);
            debug!("error body: {}", sanitize_for_logging(&body, 200));
            let message = api_error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(QuoteError::Protocol {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl QuoteSource for TwitterApi {
    fn name(&self) -> &str {
        "X API v2"
    }

    async fn fetch_quotes(&self, post: &PostId, cursor: Option<&Cursor>) -> Result<QuotePage> {
        let mut query = vec![
            ("max_results", self.page_size.to_string()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
            ("expansions", "author_id".to_string()),
            ("user.fields", USER_FIELDS.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("pagination_token", cursor.as_str().to_string()));
        }

        debug!(post = %post, paged = cursor.is_some(), "fetching quote tweets");
        let body = self.get_text(&self.quotes_url(post), &query).await?;
        let page = parse_page(&body)?;
        info!(
            post = %post,
            count = page.records.len(),
            has_more = page.next_cursor.is_some(),
            "fetched quote tweets"
        );
        Ok(page)
    }
}

// X API response types

#[derive(Deserialize, Default)]
#[serde(default)]
struct TwResponse {
    data: Vec<TwTweet>,
    includes: TwIncludes,
    meta: TwMeta,
    errors: Vec<TwProblem>,
}

#[derive(Deserialize)]
struct TwTweet {
    id: String,
    text: Option<String>,
    author_id: Option<String>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TwIncludes {
    users: Vec<TwUser>,
}

#[derive(Deserialize)]
struct TwUser {
    id: String,
    username: Option<String>,
    name: Option<String>,
    verified: Option<bool>,
    profile_image_url: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TwMeta {
    next_token: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TwProblem {
    title: Option<String>,
    detail: Option<String>,
    message: Option<String>,
}

impl TwProblem {
    fn describe(&self) -> Option<String> {
        self.detail
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.title.clone())
    }
}

/// Normalize one response body into a page.
///
/// Every entry of `data` yields exactly one record, in order. Authors missing
/// from `includes.users` get placeholder values. An empty `data` is the end
/// of the stream and never carries a cursor.
fn parse_page(body: &str) -> Result<QuotePage> {
    let response: TwResponse = serde_json::from_str(body)?;

    if response.data.is_empty() {
        if let Some(problem) = response.errors.first() {
            return Err(QuoteError::Protocol {
                status: 200,
                message: problem
                    .describe()
                    .unwrap_or_else(|| "request returned no data".to_string()),
            });
        }
        return Ok(QuotePage::default());
    }

    let users: HashMap<&str, &TwUser> = response
        .includes
        .users
        .iter()
        .map(|u| (u.id.as_str(), u))
        .collect();

    let records = response
        .data
        .iter()
        .map(|tweet| {
            let author = tweet
                .author_id
                .as_deref()
                .and_then(|id| users.get(id).copied());
            let seed = tweet.author_id.as_deref().unwrap_or(&tweet.id);

            QuoteTweet {
                id: tweet.id.clone(),
                username: author
                    .and_then(|u| u.username.clone())
                    .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
                display_name: author
                    .and_then(|u| u.name.clone())
                    .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string()),
                verified: author.and_then(|u| u.verified).unwrap_or(false),
                avatar: author
                    .and_then(|u| u.profile_image_url.clone())
                    .unwrap_or_else(|| placeholder_avatar(seed)),
                text: tweet.text.clone().unwrap_or_default(),
                created_at: tweet.created_at,
            }
        })
        .collect();

    Ok(QuotePage {
        records,
        next_cursor: response
            .meta
            .next_token
            .filter(|t| !t.is_empty())
            .map(Cursor::new),
    })
}

/// Pull a human-readable message out of an API error body, if it has one.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let top = serde_json::from_value::<TwProblem>(value.clone())
        .ok()
        .and_then(|p| p.describe());
    top.or_else(|| {
        value["errors"]
            .get(0)
            .and_then(|e| serde_json::from_value::<TwProblem>(e.clone()).ok())
            .and_then(|p| p.describe())
    })
}

const AVATAR_PALETTE: &[&str] = &[
    "#5d7488", "#1d9bf0", "#7856ff", "#f91880", "#00ba7c", "#ffd400", "#ff7a00", "#8b98a5",
];

/// Deterministic placeholder avatar: a filled circle whose colour depends
/// only on `seed`.
pub fn placeholder_avatar(seed: &str) -> String {
    // FNV-1a, stable across runs and platforms
    let hash = seed.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
        (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    });
    let color = AVATAR_PALETTE[(hash % AVATAR_PALETTE.len() as u64) as usize];
    let svg = format!(
        r#"<svg width="48" height="48" viewBox="0 0 48 48" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="24" cy="24" r="24" fill="{}"/></svg>"#,
        color
    );
    format!("data:image/svg+xml;utf8,{}", urlencoding::encode(&svg))
}

/// Truncate and strip control characters so response bodies are safe to log.
fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_len {
        let head: String = sanitized.chars().take(max_len).collect();
        format!("{}... [{} bytes total]", head, text.len())
    } else {
        sanitized
    }
}
