//! # Pace Statusline
//!
//! A statusline for Claude Code sessions that shows how fast the account's
//! usage limits are being consumed.
//!
//! ## Overview
//!
//! Each invocation reads the session JSON the host pipes on stdin, looks up the
//! 5-hour and 7-day rate-limit utilization (cached on disk for a minute), and
//! prints one ANSI line with:
//! - Working directory, Git branch/dirty/ahead-behind and model
//! - Session cost and a context-window bar
//! - Per-window bars splitting actual usage from the linear end-of-window
//!   projection, tinted by pace (ok / warn / critical)
//!
//! Every failure degrades to a shorter line; nothing here aborts the render.
//!
//! ## Features
//!
//! - `git` (default): Enables repository inspection via gix
//! - `colors` (default): Enables terminal color output via owo-colors

/// Block-glyph progress bars
pub mod bar;

/// On-disk cache of the last usage response
pub mod cache;

/// Command-line argument parsing and configuration
pub mod cli;

/// OAuth token lookup
pub mod credentials;

/// Line assembly for text and JSON output
pub mod display;

/// Git repository inspection (feature-gated)
#[cfg(feature = "git")]
pub mod git;

/// stderr diagnostics
pub mod logging;

/// Data models for hook input, usage payloads and Git info
pub mod models;

/// End-of-window projection and pace classification
pub mod projection;

/// Usage limits retrieved from the Claude OAuth API
pub mod usage_api;

/// Paths, formatting and env helpers
pub mod utils;
