//! # Projection Module
//!
//! Linear end-of-window projection for the rate-limit windows and the
//! traffic-light pace derived from it.
//!
//! Usage is assumed to accrue at a constant rate since the window opened, so
//! the projected utilization is `current * total / elapsed`. All arithmetic is
//! integer with truncation; the floor is part of the contract.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{UsageSnapshot, UsageWindow};
use crate::utils::{FIVE_HOUR_WINDOW_SECONDS, SEVEN_DAY_WINDOW_SECONDS};

/// Which rate-limit window a state describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    FiveHour,
    SevenDay,
}

impl WindowKind {
    pub fn total_seconds(self) -> i64 {
        match self {
            WindowKind::FiveHour => FIVE_HOUR_WINDOW_SECONDS,
            WindowKind::SevenDay => SEVEN_DAY_WINDOW_SECONDS,
        }
    }

    pub fn label(self, long: bool) -> &'static str {
        match (self, long) {
            (WindowKind::FiveHour, false) => "5h",
            (WindowKind::FiveHour, true) => "5-hour",
            (WindowKind::SevenDay, false) => "7d",
            (WindowKind::SevenDay, true) => "weekly",
        }
    }
}

/// Severity of the consumption pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    /// Not on track to exhaust the window.
    Ok,
    /// On pace to exhaust the quota before the window resets.
    Warn,
    /// Quota already exhausted.
    Critical,
}

/// Project utilization to the end of the window.
///
/// Returns `utilization` unchanged when the remaining time is unknown,
/// non-positive, or the window has not measurably started.
pub fn project(utilization: u32, seconds_remaining: Option<i64>, total_window_seconds: i64) -> u32 {
    let Some(remaining) = seconds_remaining.filter(|s| *s > 0) else {
        return utilization;
    };
    let elapsed = total_window_seconds - remaining;
    if elapsed <= 0 {
        return utilization;
    }
    let projected = i64::from(utilization) * total_window_seconds / elapsed;
    projected.min(100) as u32
}

/// Classify a (current, projected) pair. Exhaustion wins over projection.
pub fn classify(utilization: u32, projected: u32) -> Pace {
    if utilization >= 100 {
        Pace::Critical
    } else if projected >= 100 {
        Pace::Warn
    } else {
        Pace::Ok
    }
}

/// Per-invocation view of one window: derived from a snapshot and `now`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowState {
    pub kind: WindowKind,
    pub resets_at: Option<DateTime<Utc>>,
    pub current_utilization: u32,
    pub seconds_remaining: Option<i64>,
    pub projected_utilization: u32,
    pub pace: Pace,
}

impl WindowState {
    pub fn new(kind: WindowKind, window: &UsageWindow, now: DateTime<Utc>) -> Self {
        // float -> int casts truncate toward zero and saturate negatives at 0
        let current_utilization = (window.utilization as u32).min(100);
        let seconds_remaining = window.resets_at.map(|r| (r - now).num_seconds());
        let projected_utilization =
            project(current_utilization, seconds_remaining, kind.total_seconds());
        WindowState {
            kind,
            resets_at: window.resets_at,
            current_utilization,
            seconds_remaining,
            projected_utilization,
            pace: classify(current_utilization, projected_utilization),
        }
    }
}

/// States for every window present in the snapshot, five-hour first.
pub fn window_states(snapshot: &UsageSnapshot, now: DateTime<Utc>) -> Vec<WindowState> {
    let mut states = vec![WindowState::new(WindowKind::FiveHour, &snapshot.five_hour, now)];
    if let Some(week) = snapshot.seven_day.as_ref() {
        states.push(WindowState::new(WindowKind::SevenDay, week, now));
    }
    states
}
