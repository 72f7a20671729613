//! # Git Module
//!
//! Branch, dirty flag and upstream divergence for the statusline's VCS
//! segment, read in-process with gix.

use crate::models::git::GitInfo;
use std::path::Path;

/// Counts past this many commits are reported as this many
const MAX_DIVERGENCE_COUNT: usize = 10_000;

pub fn read_git_info(start_dir: &Path) -> Option<GitInfo> {
    let repo = gix::discover(start_dir).ok()?;
    let mut info = GitInfo::default();

    let mut head = repo.head().ok()?;
    if let Some(name) = head.referent_name() {
        info.branch = Some(name.shorten().to_string());
    }
    let head_id = head.try_peel_to_id().ok().flatten();
    if let Some(id) = head_id.as_ref() {
        info.short_commit = Some(id.to_hex().to_string().chars().take(7).collect());
    }

    // untracked files do not count as dirty
    info.is_clean = repo.is_dirty().ok().map(|dirty| !dirty);

    if let (Some(branch), Some(head_id)) = (info.branch.as_deref(), head_id) {
        if let Some((ahead, behind)) = upstream_divergence(&repo, branch, head_id) {
            info.ahead = Some(ahead);
            info.behind = Some(behind);
        }
    }
    Some(info)
}

/// Commits on HEAD missing upstream, and upstream commits missing from HEAD.
fn upstream_divergence(
    repo: &gix::Repository,
    branch: &str,
    head_id: gix::Id<'_>,
) -> Option<(usize, usize)> {
    let cfg = repo.config_snapshot();
    let key_remote = format!("branch.{branch}.remote");
    let key_merge = format!("branch.{branch}.merge");
    let remote = cfg.string(key_remote.as_str())?.to_string();
    let merge = cfg.string(key_merge.as_str())?.to_string();
    let merge_short = merge.strip_prefix("refs/heads/").unwrap_or(merge.as_str());
    let upstream_ref = format!("refs/remotes/{remote}/{merge_short}");

    let mut up_ref = repo.find_reference(upstream_ref.as_str()).ok()?;
    let up_id = up_ref.peel_to_id().ok()?.detach();
    let head_id = head_id.detach();

    Some((
        exclusive_commits(repo, head_id, up_id)?,
        exclusive_commits(repo, up_id, head_id)?,
    ))
}

/// Commits reachable from `tip` but not from `hidden`, like `git rev-list hidden..tip`.
fn exclusive_commits(
    repo: &gix::Repository,
    tip: gix::ObjectId,
    hidden: gix::ObjectId,
) -> Option<usize> {
    let walk = repo.rev_walk([tip]).with_hidden([hidden]).all().ok()?;
    Some(walk.take(MAX_DIVERGENCE_COUNT).filter_map(Result::ok).count())
}
