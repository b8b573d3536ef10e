use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimeMode {
    #[default]
    Duration,
    Deadline,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeConfig {
    pub mode: TimeMode,
    /// Session length in milliseconds; meaningful in duration mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

impl TimeConfig {
    pub fn duration_ms(duration_ms: u64) -> Self {
        Self {
            mode: TimeMode::Duration,
            duration: Some(duration_ms),
            deadline: None,
        }
    }

    pub fn deadline(deadline: DateTime<Utc>) -> Self {
        Self {
            mode: TimeMode::Deadline,
            duration: None,
            deadline: Some(deadline),
        }
    }

    /// Configured session budget used for progress and expiry. Deadline
    /// sessions and zero durations have no budget.
    pub fn total_duration_ms(&self) -> Option<u64> {
        match self.mode {
            TimeMode::Duration => self.duration.filter(|ms| *ms > 0),
            TimeMode::Deadline => None,
        }
    }
}
