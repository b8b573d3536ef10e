use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStatus {
    Early,
    OnTime,
    Overtime,
}

impl CompletionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CompletionStatus::Early => "Completed Early",
            CompletionStatus::OnTime => "Completed On Time",
            CompletionStatus::Overtime => "Completed Overtime",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatistics {
    pub total_planned_time: u64,
    pub total_actual_time: u64,
    pub time_spent_on_activities: u64,
    pub overtime_amount: u64,
    pub completion_status: CompletionStatus,
    /// Planned over actual, as a rounded percentage.
    pub efficiency: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBreakdown {
    pub id: String,
    pub name: String,
    pub color: String,
    pub planned_time: u64,
    pub actual_time: u64,
    /// `actual - planned`, in milliseconds.
    pub difference: i64,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub statistics: SessionStatistics,
    pub activities: Vec<ActivityBreakdown>,
    /// Whether any activity ever got a progress record.
    pub has_progress: bool,
}
