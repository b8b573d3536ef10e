#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use timely_lib::{
    models::{Activity, Phase, SessionState, TimeConfig},
    timer::{ActivityEngine, ManualClock, ManualTicker, SessionHost},
    utils::time::MS_PER_MINUTE,
};

/// Session owner that keeps every replacement and completion it receives.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub state: SessionState,
    pub changes: Vec<SessionState>,
    pub completions: Vec<SessionState>,
}

impl RecordingHost {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn time_spent(&self, activity_id: &str) -> u64 {
        self.state.time_spent_ms(activity_id)
    }
}

impl SessionHost for RecordingHost {
    fn session(&self) -> &SessionState {
        &self.state
    }

    fn on_state_change(&mut self, state: SessionState) {
        self.state = state.clone();
        self.changes.push(state);
    }

    fn on_complete(&mut self, state: SessionState) {
        self.completions.push(state);
    }
}

pub fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
}

/// Activity-phase session with a duration budget and one activity per
/// `(id, estimate minutes)` pair.
pub fn session(budget_minutes: u64, activities: &[(&str, u64)]) -> SessionState {
    SessionState {
        phase: Phase::Activity,
        time_config: Some(TimeConfig::duration_ms(budget_minutes * MS_PER_MINUTE)),
        activities: activities
            .iter()
            .map(|(id, estimate)| {
                Activity::new(*id, id.to_uppercase(), "hsl(120, 70%, 50%)")
                    .with_estimate_ms(estimate * MS_PER_MINUTE)
            })
            .collect(),
        session_start_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
        ..SessionState::default()
    }
}

pub fn mount(host: &mut RecordingHost) -> (ActivityEngine, ManualClock, ManualTicker) {
    let clock = clock();
    let ticker = ManualTicker::new();
    let engine = ActivityEngine::mount(host, Box::new(clock.clone()), Box::new(ticker.clone()))
        .expect("session should be valid");
    (engine, clock, ticker)
}

/// Advances one second at a time, ticking after each step.
pub fn run_for(
    engine: &mut ActivityEngine,
    host: &mut RecordingHost,
    clock: &ManualClock,
    secs: u64,
) {
    for _ in 0..secs {
        clock.advance_secs(1);
        engine.tick(host);
    }
}
