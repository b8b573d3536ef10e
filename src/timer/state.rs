use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::MS_PER_SECOND;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Transient timer state of the mounted engine. Never persisted; rebuilt
/// from the session on rehydrate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub current_activity_id: Option<String>,
    /// Whole seconds accumulated in the current run, for display.
    pub time_elapsed: u64,
    /// Milliseconds accumulated in the current run.
    pub elapsed_ms: u64,
    /// `timeSpent` the current activity already had when the run began.
    pub baseline_ms: u64,
    pub run_started_at: Option<DateTime<Utc>>,
    /// Monotonic clock reading (ms) that corresponds to `elapsed_ms == 0`.
    #[serde(skip)]
    pub running_anchor: Option<u64>,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn is_paused(&self) -> bool {
        self.status == TimerStatus::Paused && self.current_activity_id.is_some()
    }

    pub fn is_current(&self, activity_id: &str) -> bool {
        self.current_activity_id.as_deref() == Some(activity_id)
    }

    /// Total time the current activity has accumulated, persisted and in
    /// flight.
    pub fn accumulated_ms(&self) -> u64 {
        self.baseline_ms.saturating_add(self.elapsed_ms)
    }

    pub fn begin_run(
        &mut self,
        activity_id: String,
        baseline_ms: u64,
        now_ms: u64,
        started_at: DateTime<Utc>,
    ) {
        *self = Self {
            status: TimerStatus::Running,
            current_activity_id: Some(activity_id),
            time_elapsed: 0,
            elapsed_ms: 0,
            baseline_ms,
            run_started_at: Some(started_at),
            running_anchor: Some(now_ms),
        };
    }

    /// Recomputes `time_elapsed` from the anchor instead of counting ticks,
    /// so late or dropped ticks never skew the total.
    pub fn sync_elapsed_from_anchor(&mut self, now_ms: u64) -> u64 {
        if let (TimerStatus::Running, Some(anchor)) = (self.status, self.running_anchor) {
            self.elapsed_ms = now_ms.saturating_sub(anchor);
            self.time_elapsed = self.elapsed_ms / MS_PER_SECOND;
        }
        self.time_elapsed
    }

    pub fn pause(&mut self, now_ms: u64) {
        self.sync_elapsed_from_anchor(now_ms);
        self.status = TimerStatus::Paused;
        self.running_anchor = None;
    }

    /// Continues the paused run; the anchor is placed so that the retained
    /// elapsed milliseconds carry over.
    pub fn resume(&mut self, now_ms: u64) {
        self.status = TimerStatus::Running;
        self.running_anchor = Some(now_ms.saturating_sub(self.elapsed_ms));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_floors_to_whole_seconds() {
        let mut state = TimerState::new();
        state.begin_run("a".into(), 0, 10_000, Utc::now());

        assert_eq!(state.sync_elapsed_from_anchor(11_999), 1);
        assert_eq!(state.sync_elapsed_from_anchor(12_000), 2);
    }

    #[test]
    fn resume_keeps_elapsed_seconds() {
        let mut state = TimerState::new();
        state.begin_run("a".into(), 0, 0, Utc::now());
        state.pause(5_000);
        assert!(state.is_paused());
        assert_eq!(state.time_elapsed, 5);

        state.resume(60_000);
        assert_eq!(state.sync_elapsed_from_anchor(63_000), 8);
    }

    #[test]
    fn paused_state_ignores_clock() {
        let mut state = TimerState::new();
        state.begin_run("a".into(), 2_000, 0, Utc::now());
        state.pause(3_000);

        assert_eq!(state.sync_elapsed_from_anchor(100_000), 3);
        assert_eq!(state.accumulated_ms(), 5_000);
    }

    #[test]
    fn pause_cycles_keep_partial_seconds() {
        let mut state = TimerState::new();
        state.begin_run("a".into(), 0, 0, Utc::now());

        let mut now = 0;
        for _ in 0..4 {
            now += 1_500;
            state.pause(now);
            now += 10_000;
            state.resume(now);
        }
        state.pause(now);

        assert_eq!(state.elapsed_ms, 6_000);
        assert_eq!(state.time_elapsed, 6);
        assert_eq!(state.accumulated_ms(), 6_000);
    }
}
