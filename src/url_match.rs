use url::Url;

use crate::types::{PostId, PostRef};

const POST_HOSTS: &[&str] = &["x.com", "twitter.com"];

/// Match a single-post view URL (`https://x.com/{handle}/status/{id}`).
/// Returns `None` for anything that is not a post page.
pub fn match_post_url(url: &str) -> Option<PostRef> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = parsed.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("mobile."))
        .unwrap_or(host);
    if !POST_HOSTS.contains(&host) {
        return None;
    }

    let mut segments: Vec<&str> = parsed.path_segments()?.collect();
    // One trailing slash yields a final empty segment
    if segments.last() == Some(&"") {
        segments.pop();
    }

    match segments.as_slice() {
        [handle, "status", id] if is_handle(handle) && is_post_id(id) => Some(PostRef {
            author: handle.to_string(),
            id: PostId::new(*id),
        }),
        _ => None,
    }
}

fn is_handle(s: &str) -> bool {
    (1..=15).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_post_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
