use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{QuoteError, Result};

pub const DEFAULT_ANCHOR: &str = r#"aside[aria-label="Relevant people"]"#;

/// The quote_tweets endpoint accepts 10..=100 results per page.
pub const MIN_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: u32,
    pub http_timeout_secs: u64,
    pub token_env: Option<String>,
    pub token_command: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.x.com".to_string(),
            page_size: 20,
            http_timeout_secs: 15,
            token_env: Some("X_BEARER_TOKEN".to_string()),
            token_command: None,
        }
    }
}

impl ApiConfig {
    pub fn clamped_page_size(&self) -> u32 {
        self.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Selector of the region the quote panel mounts into.
    pub anchor: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            anchor: DEFAULT_ANCHOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub page: PageConfig,
}

pub fn config_dir() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("quotebox"))
}

fn config_path() -> Option<PathBuf> {
    Some(config_dir()?.join("config.toml"))
}

impl Config {
    /// Load from the default location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };
        if !path.exists() {
            return Config::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    /// Load from an explicit path. Errors are returned, not swallowed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| QuoteError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.api.base_url)
            .map_err(|e| QuoteError::Config(format!("api.base_url: {}", e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(QuoteError::Config(format!(
                "api.base_url must be http(s), got {}",
                base.scheme()
            )));
        }
        if self.api.http_timeout_secs == 0 {
            return Err(QuoteError::Config(
                "api.http_timeout_secs must be positive".to_string(),
            ));
        }
        if self.page.anchor.trim().is_empty() {
            return Err(QuoteError::Config("page.anchor is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[api]
base_url = "http://localhost:8080"
page_size = 50
http_timeout_secs = 5
token_env = "MY_TOKEN"
token_command = "pass show x"

[page]
anchor = "main"
"#;
        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.api.http_timeout_secs, 5);
        assert_eq!(config.api.token_env.as_deref(), Some("MY_TOKEN"));
        assert_eq!(config.api.token_command.as_deref(), Some("pass show x"));
        assert_eq!(config.page.anchor, "main");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = Config::parse("[api]\npage_size = 30\n").unwrap();
        assert_eq!(config.api.page_size, 30);
        assert_eq!(config.api.base_url, "https://api.x.com");
        assert_eq!(config.api.token_env.as_deref(), Some("X_BEARER_TOKEN"));
        assert_eq!(config.page.anchor, DEFAULT_ANCHOR);
    }

    #[test]
    fn empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.page_size, 20);
        assert_eq!(config.page.anchor, DEFAULT_ANCHOR);
    }

    #[test]
    fn page_size_is_clamped_to_api_bounds() {
        let mut api = ApiConfig::default();
        api.page_size = 1;
        assert_eq!(api.clamped_page_size(), MIN_PAGE_SIZE);
        api.page_size = 500;
        assert_eq!(api.clamped_page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = Config::parse("[api]\nbase_url = \"not a url\"\n").unwrap_err();
        assert!(matches!(err, QuoteError::Config(_)));

        let err = Config::parse("[api]\nbase_url = \"ftp://x.com\"\n").unwrap_err();
        assert!(matches!(err, QuoteError::Config(_)));
    }

    #[test]
    fn rejects_invalid_toml() {
        let err = Config::parse("[api\n").unwrap_err();
        assert!(matches!(err, QuoteError::Config(_)));
    }

    #[test]
    fn rejects_empty_anchor() {
        let err = Config::parse("[page]\nanchor = \"  \"\n").unwrap_err();
        assert!(matches!(err, QuoteError::Config(_)));
    }
}
