use serde::{Deserialize, Serialize};

pub const MS_PER_SECOND: u64 = 1_000;
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;

/// Whole seconds in `ms`, rounded down.
pub fn ms_to_secs(ms: u64) -> u64 {
    ms / MS_PER_SECOND
}

pub fn minutes_to_ms(minutes: u64) -> u64 {
    minutes.saturating_mul(MS_PER_MINUTE)
}

/// Clock-style rendering: `H:MM:SS` once an hour is reached, `M:SS` below.
///
/// Negative input (remaining time after the budget is spent) renders as
/// `0:00`.
pub fn format_time(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Coarse duration text used by the session summary, e.g. `1h 5 min`.
pub fn format_duration(ms: u64) -> String {
    let total_minutes = ms / MS_PER_MINUTE;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes} min")
    } else {
        format!("{minutes} min")
    }
}

/// `part / whole` as a percentage capped at 100. No budget means 0.
pub fn percent_of(part_ms: u64, whole_ms: Option<u64>) -> f64 {
    match whole_ms {
        Some(whole) if whole > 0 => (part_ms as f64 / whole as f64 * 100.0).min(100.0),
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressTier {
    Low,
    Medium,
    High,
    Critical,
}

impl ProgressTier {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 50.0 {
            ProgressTier::Low
        } else if percent < 75.0 {
            ProgressTier::Medium
        } else if percent < 90.0 {
            ProgressTier::High
        } else {
            ProgressTier::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressTier::Low => "low",
            ProgressTier::Medium => "medium",
            ProgressTier::High => "high",
            ProgressTier::Critical => "critical",
        }
    }
}
