use std::env;
use std::io::Read;
use std::path::PathBuf;

pub const FIVE_HOUR_WINDOW_SECONDS: i64 = 5 * 60 * 60;
pub const SEVEN_DAY_WINDOW_SECONDS: i64 = 7 * 24 * 60 * 60;

const CACHE_FILE_NAME: &str = "statusline-usage.cache";

/// Claude data directories, in lookup order.
///
/// An explicit comma-separated list wins when any entry in it exists; otherwise
/// `~/.claude` and then `$XDG_CONFIG_HOME/claude`.
pub fn claude_paths(override_env: Option<&str>) -> Vec<PathBuf> {
    let mut paths = vec![];
    if let Some(list) = override_env {
        for p in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let pb = PathBuf::from(p);
            if pb.is_dir() {
                paths.push(pb);
            }
        }
        if !paths.is_empty() {
            return paths;
        }
    }
    if let Some(b) = directories::BaseDirs::new() {
        for base in [b.home_dir().join(".claude"), b.config_dir().join("claude")] {
            if base.is_dir() {
                paths.push(base);
            }
        }
    }
    paths
}

/// Default location of the usage cache record.
pub fn default_cache_path() -> PathBuf {
    let home = directories::BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(env::temp_dir);
    home.join(".claude").join(CACHE_FILE_NAME)
}

pub fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn format_path(p: &str) -> String {
    if let Some(b) = directories::BaseDirs::new() {
        let home_s = b.home_dir().to_string_lossy();
        if let Some(rest) = p.strip_prefix(&*home_s) {
            return format!("~{rest}");
        }
    }
    p.to_owned()
}

pub fn format_currency(v: f64) -> String {
    format!("{v:.2}")
}

/// Compact time-until-reset: `{d}d{h}h`, `{h}h{m}m` or `{m}m`. Units truncate.
pub fn format_remaining(seconds: i64) -> String {
    if seconds < 0 {
        return "0m".to_string();
    }
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let mins = (seconds % 3_600) / 60;
    if days > 0 {
        format!("{days}d{hours}h")
    } else if hours > 0 {
        format!("{hours}h{mins}m")
    } else {
        format!("{mins}m")
    }
}

/// Env toggle that defaults to on: only `0|false|no|off` turn it off.
pub fn env_flag_enabled(var: &str) -> bool {
    match env::var(var) {
        Ok(val) => !matches!(
            val.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        Err(_) => true,
    }
}

pub fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
