use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct HookModel {
    pub id: String,
    pub display_name: String,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct HookWorkspace {
    pub current_dir: Option<String>,
    pub project_dir: Option<String>,
}

/// Optional cost summary provided by Claude Code's statusLine input
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct HookCost {
    pub total_cost_usd: Option<f64>,
    pub total_lines_added: Option<i64>,
    pub total_lines_removed: Option<i64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ContextUsage {
    pub input_tokens: Option<u64>,
    pub cache_creation_input_tokens: Option<u64>,
    pub cache_read_input_tokens: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct HookContextWindow {
    pub context_window_size: Option<u64>,
    pub used_percentage: Option<f64>,
    pub current_usage: Option<ContextUsage>,
}

impl HookContextWindow {
    /// Integer percent of the context window in use, truncated.
    ///
    /// Prefers the host-computed `used_percentage`; otherwise derives it from
    /// the current token counts and the window size.
    pub fn used_percent(&self) -> Option<u32> {
        if let Some(pct) = self.used_percentage {
            if pct.is_finite() {
                return Some((pct as u32).min(100));
            }
        }
        let size = self.context_window_size.filter(|s| *s > 0)?;
        let usage = self.current_usage.as_ref()?;
        let tokens = usage.input_tokens.unwrap_or(0)
            + usage.cache_creation_input_tokens.unwrap_or(0)
            + usage.cache_read_input_tokens.unwrap_or(0);
        Some((tokens.saturating_mul(100) / size).min(100) as u32)
    }
}

/// The JSON document the host pipes to the statusline on every refresh.
/// Every field may be missing; unknown fields are ignored.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct HookJson {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub model: HookModel,
    pub workspace: HookWorkspace,
    pub version: Option<String>,
    pub cost: Option<HookCost>,
    pub context_window: Option<HookContextWindow>,
}

impl HookJson {
    /// Directory shown in the line and used to discover the repository.
    pub fn working_dir(&self) -> Option<&str> {
        self.workspace
            .current_dir
            .as_deref()
            .or(self.cwd.as_deref())
    }

    pub fn repo_dir(&self) -> Option<&str> {
        self.workspace.project_dir.as_deref().or(self.working_dir())
    }

    pub fn model_label(&self) -> Option<&str> {
        [self.model.display_name.as_str(), self.model.id.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    pub fn context_percent(&self) -> Option<u32> {
        self.context_window.as_ref()?.used_percent()
    }
}
