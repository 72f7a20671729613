use chrono::{DateTime, Utc};
#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

use crate::bar::{self, Glyph};
use crate::cli::{Args, LabelsArg};
use crate::models::{GitInfo, HookJson};
use crate::projection::{Pace, WindowState};
use crate::utils::{format_currency, format_path, format_remaining};

/// Presentation knobs for the text line.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub color: bool,
    pub long_labels: bool,
    pub bar_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            color: true,
            long_labels: false,
            bar_width: 10,
        }
    }
}

impl From<&Args> for RenderOptions {
    fn from(args: &Args) -> Self {
        RenderOptions {
            color: args.color_enabled(),
            long_labels: matches!(args.labels, LabelsArg::Long),
            bar_width: usize::from(args.bar_width),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Dim,
    Path,
    Branch,
    Model,
    Cost,
    Good,
    Warn,
    Bad,
}

impl From<Pace> for Tone {
    fn from(pace: Pace) -> Self {
        match pace {
            Pace::Ok => Tone::Good,
            Pace::Warn => Tone::Warn,
            Pace::Critical => Tone::Bad,
        }
    }
}

#[cfg(feature = "colors")]
fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match tone {
        Tone::Dim => text.bright_black().to_string(),
        Tone::Path => text.bright_blue().to_string(),
        Tone::Branch => text.bright_white().to_string(),
        Tone::Model => text.bright_magenta().to_string(),
        Tone::Cost => text.bright_white().bold().to_string(),
        Tone::Good => text.green().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Bad => text.red().bold().to_string(),
    }
}

#[cfg(not(feature = "colors"))]
fn paint(text: &str, _tone: Tone, _color: bool) -> String {
    text.to_string()
}

fn context_tone(pct: u32) -> Tone {
    if pct >= 80 {
        Tone::Bad
    } else if pct >= 50 {
        Tone::Warn
    } else {
        Tone::Good
    }
}

/// Color a bar run by run: consumed and projected cells take the tone, empty cells are dim.
fn paint_bar(glyphs: &[Glyph], tone: Tone, color: bool) -> String {
    glyphs
        .chunk_by(|a, b| a == b)
        .map(|run| {
            let run_tone = if run[0] == Glyph::Empty { Tone::Dim } else { tone };
            paint(&bar::to_text(run), run_tone, color)
        })
        .collect()
}

fn bracketed(inner: &str, opts: &RenderOptions) -> String {
    format!(
        "{}{}{}",
        paint("[", Tone::Dim, opts.color),
        inner,
        paint("]", Tone::Dim, opts.color)
    )
}

fn git_segment(git: &GitInfo, lines_delta: Option<(i64, i64)>, opts: &RenderOptions) -> Option<String> {
    let mut seg = String::new();
    match (git.branch.as_deref(), git.short_commit.as_deref()) {
        (Some(branch), _) => seg.push_str(&format!("⎇ {branch}")),
        (None, Some(sc)) => seg.push_str(&format!("(detached@{sc})")),
        (None, None) => {}
    }
    if git.is_clean == Some(false) {
        seg.push('*');
    }
    let ahead = git.ahead.unwrap_or(0);
    let behind = git.behind.unwrap_or(0);
    if ahead > 0 || behind > 0 {
        seg.push(' ');
        if ahead > 0 {
            seg.push_str(&format!("↑{ahead}"));
        }
        if behind > 0 {
            seg.push_str(&format!("↓{behind}"));
        }
    }
    if seg.is_empty() {
        return None;
    }
    let mut inner = paint(&seg, Tone::Branch, opts.color);
    if let Some((added, removed)) = lines_delta.filter(|(a, r)| *a != 0 || *r != 0) {
        inner.push(' ');
        inner.push_str(&paint(&format!("+{added}"), Tone::Good, opts.color));
        inner.push_str(&paint(&format!("-{}", removed.abs()), Tone::Bad, opts.color));
    }
    Some(bracketed(&inner, opts))
}

fn context_segment(pct: u32, opts: &RenderOptions) -> String {
    let label = if opts.long_labels { "context" } else { "ctx" };
    let tone = context_tone(pct);
    let glyphs = bar::render_simple(i64::from(pct), opts.bar_width);
    format!(
        "{} {} {}",
        paint(label, Tone::Dim, opts.color),
        paint_bar(&glyphs, tone, opts.color),
        paint(&format!("{pct}%"), tone, opts.color)
    )
}

/// `5h ███▒▒▒░░░░ 30%→60% 2h30m`
fn window_segment(state: &WindowState, opts: &RenderOptions) -> String {
    let tone = Tone::from(state.pace);
    let glyphs = bar::render(
        i64::from(state.current_utilization),
        i64::from(state.projected_utilization),
        opts.bar_width,
    );
    let mut pct = format!("{}%", state.current_utilization);
    if state.projected_utilization != state.current_utilization {
        pct.push_str(&format!("→{}%", state.projected_utilization));
    }
    let mut seg = format!(
        "{} {} {}",
        paint(state.kind.label(opts.long_labels), Tone::Dim, opts.color),
        paint_bar(&glyphs, tone, opts.color),
        paint(&pct, tone, opts.color)
    );
    if let Some(secs) = state.seconds_remaining {
        seg.push(' ');
        seg.push_str(&paint(&format_remaining(secs), Tone::Dim, opts.color));
    }
    seg
}

/// Assemble the full status line. Segments without data are left out.
pub fn render_status_line(
    hook: &HookJson,
    git: Option<&GitInfo>,
    usage: Option<&[WindowState]>,
    opts: &RenderOptions,
) -> String {
    let mut head: Vec<String> = Vec::new();
    if let Some(dir) = hook.working_dir() {
        head.push(paint(&format_path(dir), Tone::Path, opts.color));
    }
    let lines_delta = hook.cost.as_ref().map(|c| {
        (
            c.total_lines_added.unwrap_or(0),
            c.total_lines_removed.unwrap_or(0),
        )
    });
    if let Some(seg) = git.and_then(|g| git_segment(g, lines_delta, opts)) {
        head.push(seg);
    }
    if let Some(model) = hook.model_label() {
        head.push(bracketed(&paint(model, Tone::Model, opts.color), opts));
    }

    let mut metrics: Vec<String> = Vec::new();
    if let Some(cost) = hook.cost.as_ref().and_then(|c| c.total_cost_usd) {
        metrics.push(paint(&format!("${}", format_currency(cost)), Tone::Cost, opts.color));
    }
    if let Some(pct) = hook.context_percent() {
        metrics.push(context_segment(pct, opts));
    }
    for state in usage.unwrap_or_default() {
        metrics.push(window_segment(state, opts));
    }

    let separator = format!(" {} ", paint("·", Tone::Dim, opts.color));
    let mut parts: Vec<String> = Vec::new();
    if !head.is_empty() {
        parts.push(head.join(" "));
    }
    if !metrics.is_empty() {
        parts.push(metrics.join(&separator));
    }
    parts.join(&separator)
}

/// Shown when the host sent nothing on stdin.
pub fn render_placeholder(opts: &RenderOptions) -> String {
    format!(
        "{} {}",
        paint("❯", Tone::Path, opts.color),
        paint("[waiting for valid input]", Tone::Dim, opts.color)
    )
}

fn window_json(state: &WindowState) -> serde_json::Value {
    serde_json::json!({
        "utilization": state.current_utilization,
        "projected": state.projected_utilization,
        "pace": state.pace,
        "seconds_remaining": state.seconds_remaining,
        "resets_in": state.seconds_remaining.map(format_remaining),
        "resets_at": state.resets_at.map(|d| d.to_rfc3339()),
    })
}

pub fn build_json_output(
    hook: &HookJson,
    git: Option<&GitInfo>,
    usage: Option<&[WindowState]>,
    now: DateTime<Utc>,
) -> serde_json::Value {
    let usage_value = usage.map(|states| {
        let mut obj = serde_json::Map::new();
        for state in states {
            let key = serde_json::to_value(state.kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            obj.insert(key, window_json(state));
        }
        serde_json::Value::Object(obj)
    });

    serde_json::json!({
        "generated_at": now.to_rfc3339(),
        "model": {"id": hook.model.id.clone(), "display_name": hook.model.display_name.clone()},
        "cwd": hook.working_dir(),
        "project_dir": hook.workspace.project_dir.clone(),
        "cost_usd": hook.cost.as_ref().and_then(|c| c.total_cost_usd).map(|v| (v * 100.0).round() / 100.0),
        "context_percent": hook.context_percent(),
        "git": git,
        "usage": usage_value,
    })
}

pub fn print_json_output(
    hook: &HookJson,
    git: Option<&GitInfo>,
    usage: Option<&[WindowState]>,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let json = build_json_output(hook, git, usage, now);
    println!("{}", serde_json::to_string(&json)?);
    Ok(())
}
