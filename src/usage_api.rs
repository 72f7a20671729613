use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheRecord, CacheStore, FileCacheStore};
use crate::credentials::{SystemTokenSource, TokenSource};
use crate::models::UsageSnapshot;
use crate::utils::{env_flag_enabled, env_non_empty};

pub const USAGE_ENDPOINT: &str = "https://api.anthropic.com/api/oauth/usage";
const ANTHROPIC_BETA: &str = "oauth-2025-04-20";
const DEFAULT_USER_AGENT: &str = "claude-code";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.\d+\.\d+(?:-[A-Za-z0-9.]+)?)").expect("version pattern is valid")
});

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("usage request timed out")]
    Timeout,
    #[error("usage request failed: {0}")]
    Transport(String),
    #[error("usage endpoint returned HTTP {0}")]
    Status(u16),
    #[error("usage endpoint returned an empty body")]
    EmptyBody,
    #[error("usage response has no five_hour window")]
    UnrecognizedPayload,
}

/// One GET against the usage endpoint, returning the raw body.
pub trait UsageTransport {
    fn fetch(&self, token: &str) -> Result<String, FetchError>;
}

pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self::with_endpoint(USAGE_ENDPOINT, user_agent)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, user_agent, REQUEST_TIMEOUT)
    }

    /// `timeout` bounds the whole request: connect, send and body read.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        HttpTransport {
            agent,
            endpoint: endpoint.into(),
            user_agent: user_agent.into(),
        }
    }
}

impl UsageTransport for HttpTransport {
    fn fetch(&self, token: &str) -> Result<String, FetchError> {
        let mut response = self
            .agent
            .get(self.endpoint.as_str())
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/json")
            .header("anthropic-beta", ANTHROPIC_BETA)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(transport_error)?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }
}

fn transport_error(err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Timeout(_) => FetchError::Timeout,
        other => FetchError::Transport(other.to_string()),
    }
}

/// `User-Agent` for the usage request.
///
/// `CLAUDE_STATUSLINE_USER_AGENT` verbatim, else `claude-code/<version>` from
/// `CLAUDE_CODE_VERSION` or the version the host reported, else `claude-code`.
pub fn user_agent(host_version: Option<&str>) -> String {
    if let Some(explicit) = env_non_empty("CLAUDE_STATUSLINE_USER_AGENT") {
        return explicit;
    }
    env_non_empty("CLAUDE_CODE_VERSION")
        .as_deref()
        .and_then(extract_version)
        .or_else(|| host_version.and_then(extract_version))
        .map(|v| format!("{DEFAULT_USER_AGENT}/{v}"))
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
}

fn extract_version(text: &str) -> Option<String> {
    VERSION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Cache-first usage lookup.
///
/// Never fails: a missing token yields `None`, a failed fetch falls back to
/// the last cached record no matter how old, and only a recognisable
/// response is ever written back.
pub struct UsageFetcher<'a> {
    cache: &'a dyn CacheStore,
    tokens: &'a dyn TokenSource,
    transport: &'a dyn UsageTransport,
}

impl<'a> UsageFetcher<'a> {
    pub fn new(
        cache: &'a dyn CacheStore,
        tokens: &'a dyn TokenSource,
        transport: &'a dyn UsageTransport,
    ) -> Self {
        UsageFetcher {
            cache,
            tokens,
            transport,
        }
    }

    pub fn get_usage(&self, now: DateTime<Utc>) -> Option<UsageSnapshot> {
        let now_ts = now.timestamp();
        let cached = self.cache.read();

        if let Some(record) = cached.as_ref() {
            if self.cache.is_fresh(record, now_ts) {
                if let Some(snapshot) = UsageSnapshot::from_payload(&record.payload) {
                    debug!(age = record.age(now_ts), "usage served from cache");
                    return Some(snapshot);
                }
                debug!("cached usage payload unreadable, refetching");
            } else {
                debug!(age = record.age(now_ts), "usage cache stale");
            }
        }

        let Some(token) = self.tokens.resolve_token() else {
            debug!("no OAuth token available, usage unknown");
            return None;
        };

        match self.fetch_snapshot(&token) {
            Ok((body, snapshot)) => {
                if let Err(e) = self.cache.write(&CacheRecord::new(now_ts, body)) {
                    warn!(error = %e, "failed to persist usage cache");
                }
                Some(snapshot)
            }
            Err(e) => {
                debug!(error = %e, "usage fetch failed, falling back to cache");
                cached.and_then(|record| UsageSnapshot::from_payload(&record.payload))
            }
        }
    }

    fn fetch_snapshot(&self, token: &str) -> Result<(String, UsageSnapshot), FetchError> {
        let body = self.transport.fetch(token)?;
        let snapshot = UsageSnapshot::from_payload(&body).ok_or(FetchError::UnrecognizedPayload)?;
        Ok((body, snapshot))
    }
}

/// Wire up the real cache file, credential lookup and HTTP client.
///
/// Returns `None` without touching anything when `CLAUDE_STATUSLINE_FETCH_USAGE`
/// is switched off.
pub fn load_usage(
    cache_path: PathBuf,
    claude_paths: Vec<PathBuf>,
    host_version: Option<&str>,
    now: DateTime<Utc>,
) -> Option<UsageSnapshot> {
    if !env_flag_enabled("CLAUDE_STATUSLINE_FETCH_USAGE") {
        debug!("usage fetch disabled");
        return None;
    }
    let cache = FileCacheStore::new(cache_path);
    let tokens = SystemTokenSource::new(claude_paths);
    let transport = HttpTransport::new(user_agent(host_version));
    UsageFetcher::new(&cache, &tokens, &transport).get_usage(now)
}
