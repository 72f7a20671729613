//! OAuth token lookup for the usage endpoint.
//!
//! Best effort throughout: every source that is missing, locked, or holds
//! something unexpected is skipped, and the caller just gets `None`.

use serde_json::Value;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use crate::utils::env_non_empty;

/// Secure-storage service name the Claude CLI stores its credentials under.
pub const KEYCHAIN_SERVICE: &str = "Claude Code-credentials";

const TOKEN_ENV_VARS: [&str; 2] = ["CLAUDE_CODE_OAUTH_TOKEN", "ANTHROPIC_AUTH_TOKEN"];

/// Field paths tried, in order, inside a stored credentials blob.
const TOKEN_FIELD_PATHS: [&[&str]; 4] = [
    &["claudeAiOauth", "accessToken"],
    &["claudeAiOauth", "access_token"],
    &["accessToken"],
    &["access_token"],
];

/// Anything that can hand out a bearer token.
pub trait TokenSource {
    fn resolve_token(&self) -> Option<String>;
}

/// Environment, then the platform credential store, then `.credentials.json`.
#[derive(Debug, Clone, Default)]
pub struct SystemTokenSource {
    claude_paths: Vec<PathBuf>,
}

impl SystemTokenSource {
    pub fn new(claude_paths: Vec<PathBuf>) -> Self {
        SystemTokenSource { claude_paths }
    }

    fn from_env() -> Option<String> {
        TOKEN_ENV_VARS.iter().find_map(|var| env_non_empty(var))
    }

    fn from_credentials_files(&self) -> Option<String> {
        self.claude_paths.iter().find_map(|base| {
            let path = base.join(".credentials.json");
            let raw = fs::read_to_string(&path).ok()?;
            let token = token_from_blob(&raw);
            if token.is_none() {
                debug!(path = %path.display(), "credentials file has no usable token");
            }
            token
        })
    }
}

impl TokenSource for SystemTokenSource {
    fn resolve_token(&self) -> Option<String> {
        Self::from_env()
            .or_else(read_from_secure_storage)
            .or_else(|| self.from_credentials_files())
    }
}

/// Pull the token out of a stored JSON blob using the first matching field path.
pub fn token_from_blob(raw: &str) -> Option<String> {
    let json: Value = serde_json::from_str(raw.trim()).ok()?;
    TOKEN_FIELD_PATHS.iter().find_map(|path| {
        let value = path.iter().try_fold(&json, |node, key| node.get(*key))?;
        let token = value.as_str()?.trim();
        (!token.is_empty()).then(|| token.to_string())
    })
}

/// Service name, suffixed with a short hash of `CLAUDE_CONFIG_DIR` when set so
/// separate config dirs keep separate credentials.
pub fn service_name() -> String {
    use sha2::{Digest, Sha256};

    let mut name = KEYCHAIN_SERVICE.to_string();
    if let Ok(config_dir) = env::var("CLAUDE_CONFIG_DIR") {
        let hash = Sha256::digest(config_dir.as_bytes());
        let suffix: String = format!("{hash:x}").chars().take(8).collect();
        name.push('-');
        name.push_str(&suffix);
    }
    name
}

fn run_lookup(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        debug!(program, status = ?output.status.code(), "credential store lookup failed");
        return None;
    }
    let blob = String::from_utf8_lossy(&output.stdout);
    token_from_blob(&blob)
}

#[cfg(target_os = "macos")]
fn read_from_secure_storage() -> Option<String> {
    let service = service_name();
    let user = env::var("USER").ok()?;
    run_lookup(
        "security",
        &["find-generic-password", "-a", &user, "-s", &service, "-w"],
    )
}

#[cfg(target_os = "linux")]
fn read_from_secure_storage() -> Option<String> {
    let service = service_name();
    run_lookup("secret-tool", &["lookup", "service", &service])
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn read_from_secure_storage() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn blob_field_priority() {
        let raw = r#"{"claudeAiOauth":{"accessToken":" sk-ant-oat01 ","refreshToken":"r"},
                      "accessToken":"flat"}"#;
        assert_eq!(token_from_blob(raw).as_deref(), Some("sk-ant-oat01"));

        let raw = r#"{"claudeAiOauth":{"accessToken":""},"access_token":"snake"}"#;
        assert_eq!(token_from_blob(raw).as_deref(), Some("snake"));

        let raw = r#"{"claudeAiOauth":{"access_token":"nested-snake"}}"#;
        assert_eq!(token_from_blob(raw).as_deref(), Some("nested-snake"));
    }

    #[test]
    fn blob_without_token() {
        assert!(token_from_blob(r#"{"claudeAiOauth":{"refreshToken":"r"}}"#).is_none());
        assert!(token_from_blob(r#"{"accessToken":42}"#).is_none());
        assert!(token_from_blob("password123").is_none());
        assert!(token_from_blob("").is_none());
    }

    #[test]
    #[serial]
    fn service_name_tracks_config_dir() {
        unsafe { env::remove_var("CLAUDE_CONFIG_DIR") };
        assert_eq!(service_name(), KEYCHAIN_SERVICE);

        unsafe { env::set_var("CLAUDE_CONFIG_DIR", "/home/me/.claude-work") };
        let name = service_name();
        unsafe { env::remove_var("CLAUDE_CONFIG_DIR") };
        let suffix = name.strip_prefix("Claude Code-credentials-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    #[serial]
    fn env_token_wins() {
        unsafe { env::set_var("CLAUDE_CODE_OAUTH_TOKEN", "  from-env  ") };
        let token = SystemTokenSource::default().resolve_token();
        unsafe { env::remove_var("CLAUDE_CODE_OAUTH_TOKEN") };
        assert_eq!(token.as_deref(), Some("from-env"));
    }

    #[test]
    fn credentials_file_lookup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".credentials.json"),
            r#"{"claudeAiOauth":{"accessToken":"file-token"}}"#,
        )
        .unwrap();
        let source = SystemTokenSource::new(vec![
            dir.path().join("missing"),
            dir.path().to_path_buf(),
        ]);
        assert_eq!(source.from_credentials_files().as_deref(), Some("file-token"));
    }
}
