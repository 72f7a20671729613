use anyhow::Result;
use chrono::Utc;
use tracing::warn;

use pace_statusline::cli::Args;
use pace_statusline::display::{
    RenderOptions, print_json_output, render_placeholder, render_status_line,
};
use pace_statusline::logging::init_logging;
use pace_statusline::models::{GitInfo, HookJson};
use pace_statusline::projection::window_states;
use pace_statusline::usage_api::load_usage;
use pace_statusline::utils::{claude_paths, default_cache_path, read_stdin};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);
    let opts = RenderOptions::from(&args);

    let stdin = read_stdin()?;
    if stdin.iter().all(u8::is_ascii_whitespace) {
        println!("{}", render_placeholder(&opts));
        return Ok(());
    }
    let hook: HookJson = serde_json::from_slice(&stdin).unwrap_or_else(|e| {
        warn!(error = %e, "unreadable hook json, rendering without it");
        HookJson::default()
    });

    let git_info = read_git(&hook);

    let now = Utc::now();
    let cache_path = args.cache_file.clone().unwrap_or_else(default_cache_path);
    let paths = claude_paths(args.claude_config_dir.as_deref());
    let usage = load_usage(cache_path, paths, hook.version.as_deref(), now)
        .map(|snapshot| window_states(&snapshot, now));

    if args.json {
        print_json_output(&hook, git_info.as_ref(), usage.as_deref(), now)?;
    } else {
        println!(
            "{}",
            render_status_line(&hook, git_info.as_ref(), usage.as_deref(), &opts)
        );
    }
    Ok(())
}

#[cfg(feature = "git")]
fn read_git(hook: &HookJson) -> Option<GitInfo> {
    let dir = hook.repo_dir()?;
    pace_statusline::git::read_git_info(std::path::Path::new(dir))
}

#[cfg(not(feature = "git"))]
fn read_git(_hook: &HookJson) -> Option<GitInfo> {
    None
}
