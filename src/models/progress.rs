use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accumulated time for one activity. At most one entry exists per activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProgress {
    pub activity_id: String,
    pub completed: bool,
    /// Milliseconds spent on the activity across every run.
    pub time_spent: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl ActivityProgress {
    pub fn new(activity_id: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            completed: false,
            time_spent: 0,
            start_time: None,
            end_time: None,
        }
    }
}
