use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ActivityStatus {
    #[default]
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Planned time for the activity, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u64>,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub color: String,
}

impl Activity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            estimated_duration: None,
            status: ActivityStatus::Pending,
            start_time: None,
            end_time: None,
            color: color.into(),
        }
    }

    pub fn with_estimate_ms(mut self, estimated_ms: u64) -> Self {
        self.estimated_duration = Some(estimated_ms);
        self
    }

    /// Estimate usable as a divisor; zero counts as "no estimate".
    pub fn estimate_ms(&self) -> Option<u64> {
        self.estimated_duration.filter(|ms| *ms > 0)
    }
}
