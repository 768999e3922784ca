use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{config_dir, ApiConfig};
use crate::error::{QuoteError, Result};

/// Run a shell command and take its trimmed stdout as the token.
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

/// Stored bearer token path: ~/.config/quotebox/token
fn token_path() -> Option<PathBuf> {
    Some(config_dir()?.join("token"))
}

fn read_token_file(path: &Path) -> Option<String> {
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn save_token(path: &Path, token: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, token)
}

/// Resolve the bearer token, trying in order:
/// 1. The configured environment variable
/// 2. The stored token file
/// 3. The configured token command (its result is stored for next time)
pub fn load_bearer_token(api: &ApiConfig) -> Result<String> {
    resolve_token(api, token_path().as_deref())
}

fn resolve_token(api: &ApiConfig, stored: Option<&Path>) -> Result<String> {
    if let Some(env_var) = &api.token_env {
        if let Ok(token) = std::env::var(env_var) {
            let token = token.trim().to_string();
            if !token.is_empty() {
                debug!("bearer token from ${}", env_var);
                return Ok(token);
            }
        }
    }

    if let Some(token) = stored.and_then(read_token_file) {
        debug!("bearer token from stored file");
        return Ok(token);
    }

    if let Some(cmd) = &api.token_command {
        if let Some(token) = try_cli_token(cmd) {
            if let Some(path) = stored {
                if let Err(e) = save_token(path, &token) {
                    warn!("could not store bearer token: {}", e);
                }
            }
            return Ok(token);
        }
    }

    Err(QuoteError::Auth(format!(
        "No bearer token found. Set {} or configure api.token_command.",
        api.token_env.as_deref().unwrap_or("a token env var")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "quotebox-auth-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn api(token_env: Option<&str>, token_command: Option<&str>) -> ApiConfig {
        ApiConfig {
            token_env: token_env.map(String::from),
            token_command: token_command.map(String::from),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn env_var_wins() {
        std::env::set_var("QUOTEBOX_TEST_TOKEN_ENV", "  from-env \n");
        let token = resolve_token(&api(Some("QUOTEBOX_TEST_TOKEN_ENV"), None), None).unwrap();
        assert_eq!(token, "from-env");
    }

    #[test]
    fn stored_file_used_when_env_missing() {
        let dir = scratch_dir("stored");
        let path = dir.join("token");
        save_token(&path, "stored-token\n").unwrap();

        let config = api(Some("QUOTEBOX_TEST_UNSET_VAR"), None);
        let token = resolve_token(&config, Some(&path)).unwrap();
        assert_eq!(token, "stored-token");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn command_token_is_stored() {
        let dir = scratch_dir("command");
        let path = dir.join("token");

        let token = resolve_token(&api(None, Some("echo cmd-token")), Some(&path)).unwrap();
        assert_eq!(token, "cmd-token");
        assert_eq!(read_token_file(&path).as_deref(), Some("cmd-token"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failing_command_is_auth_error() {
        let err = resolve_token(&api(None, Some("exit 1")), None).unwrap_err();
        assert!(matches!(err, QuoteError::Auth(_)));
    }

    #[test]
    fn empty_token_file_is_ignored() {
        let dir = scratch_dir("empty");
        let path = dir.join("token");
        save_token(&path, "   \n").unwrap();
        assert_eq!(read_token_file(&path), None);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
