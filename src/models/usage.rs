use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Layout of `resets_at` once fractional seconds and offsets are cut off.
const RESET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One rate-limit window as reported by the usage endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageWindow {
    pub utilization: f64,
    pub resets_at: Option<DateTime<Utc>>,
}

/// A fetched (or cached) usage payload. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub five_hour: UsageWindow,
    pub seven_day: Option<UsageWindow>,
}

#[derive(Debug, Deserialize)]
struct UsageWindowDto {
    #[serde(default)]
    utilization: Option<f64>,
    #[serde(default)]
    resets_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageResponseDto {
    #[serde(default)]
    five_hour: Option<UsageWindowDto>,
    #[serde(default)]
    seven_day: Option<UsageWindowDto>,
}

impl From<UsageWindowDto> for UsageWindow {
    fn from(value: UsageWindowDto) -> Self {
        UsageWindow {
            utilization: value.utilization.unwrap_or(0.0),
            resets_at: value.resets_at.as_deref().and_then(parse_reset_time),
        }
    }
}

impl UsageSnapshot {
    /// Parse a raw response body. Returns `None` unless the body carries a
    /// `five_hour` window, which is what marks a usable payload.
    pub fn from_payload(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let dto: UsageResponseDto = serde_json::from_str(raw).ok()?;
        Some(UsageSnapshot {
            five_hour: dto.five_hour?.into(),
            seven_day: dto.seven_day.map(UsageWindow::from),
        })
    }
}

/// Parse `resets_at` as a UTC wall-clock time in `YYYY-MM-DDTHH:MM:SS` form.
/// Fractional seconds and anything after the seconds field are dropped first.
pub fn parse_reset_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let head = raw.split('.').next().unwrap_or(raw);
    let head = head.get(..19).unwrap_or(head);
    NaiveDateTime::parse_from_str(head, RESET_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
