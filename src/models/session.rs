use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Activity, ActivityProgress, TimeConfig};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Loading,
    Setup,
    Activity,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Setup => "setup",
            Phase::Activity => "activity",
            Phase::Completed => "completed",
        }
    }
}

/// The aggregate every phase reads and replaces wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_config: Option<TimeConfig>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub activity_progress: Vec<ActivityProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_activity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_activity_id: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activity(&self, activity_id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == activity_id)
    }

    pub fn progress(&self, activity_id: &str) -> Option<&ActivityProgress> {
        self.activity_progress
            .iter()
            .find(|p| p.activity_id == activity_id)
    }

    /// Returns the progress entry for `activity_id`, creating it if needed.
    pub fn progress_entry(&mut self, activity_id: &str) -> &mut ActivityProgress {
        let index = match self
            .activity_progress
            .iter()
            .position(|p| p.activity_id == activity_id)
        {
            Some(index) => index,
            None => {
                self.activity_progress
                    .push(ActivityProgress::new(activity_id));
                self.activity_progress.len() - 1
            }
        };
        &mut self.activity_progress[index]
    }

    pub fn time_spent_ms(&self, activity_id: &str) -> u64 {
        self.progress(activity_id).map(|p| p.time_spent).unwrap_or(0)
    }

    pub fn is_completed(&self, activity_id: &str) -> bool {
        self.progress(activity_id)
            .map(|p| p.completed)
            .unwrap_or(false)
    }

    pub fn all_completed(&self) -> bool {
        !self.activities.is_empty() && self.activities.iter().all(|a| self.is_completed(&a.id))
    }

    pub fn total_time_spent_ms(&self) -> u64 {
        self.activity_progress
            .iter()
            .fold(0u64, |total, p| total.saturating_add(p.time_spent))
    }
}
