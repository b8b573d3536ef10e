use serde::Serialize;

use crate::{
    error::SessionConfigError,
    log_debug, log_info, log_warn,
    models::SessionState,
    utils::time::{format_time, ms_to_secs, percent_of},
};

use super::{Clock, TickSource, TickerGuard, TimerState};

const ENABLE_LOGS: bool = true;

/// Owner of the session the engine works on.
///
/// The engine reads the current state through `session` and reports every
/// mutation as a complete replacement value. It never keeps a copy of its
/// own between calls.
pub trait SessionHost {
    fn session(&self) -> &SessionState;
    fn on_state_change(&mut self, state: SessionState);
    fn on_complete(&mut self, state: SessionState);
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CompletionReason {
    AllActivitiesCompleted,
    DurationElapsed,
}

/// Refuses sessions that cannot be timed.
pub fn validate_session(session: &SessionState) -> Result<(), SessionConfigError> {
    if session.time_config.is_none() {
        return Err(SessionConfigError::MissingTimeConfig);
    }
    if session.activities.is_empty() {
        return Err(SessionConfigError::NoActivities);
    }
    if session.session_start_time.is_none() {
        return Err(SessionConfigError::MissingStartTime);
    }
    Ok(())
}

/// Timing engine of the activity phase.
///
/// Operations whose preconditions do not hold are silent no-ops. Once a
/// completion has been signalled every operation is a no-op.
pub struct ActivityEngine {
    state: TimerState,
    clock: Box<dyn Clock>,
    ticks: Box<dyn TickSource>,
    ticker: Option<TickerGuard>,
    /// `activeActivityId` as of the last state this engine saw or produced.
    last_seen_active: Option<String>,
    completion: Option<CompletionReason>,
}

impl ActivityEngine {
    /// Validates the session, adopts any activity already marked active and
    /// runs the expiry check once.
    pub fn mount(
        host: &mut dyn SessionHost,
        clock: Box<dyn Clock>,
        ticks: Box<dyn TickSource>,
    ) -> Result<Self, SessionConfigError> {
        validate_session(host.session())?;

        let mut engine = Self {
            state: TimerState::new(),
            clock,
            ticks,
            ticker: None,
            last_seen_active: None,
            completion: None,
        };
        engine.rehydrate(host);
        let snapshot = host.session().clone();
        engine.check_session_expiry(host, snapshot);

        Ok(engine)
    }

    pub fn current_activity_id(&self) -> Option<&str> {
        self.state.current_activity_id.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Whole seconds in the current run.
    pub fn time_elapsed(&self) -> u64 {
        self.state.time_elapsed
    }

    pub fn is_ticker_live(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn completion(&self) -> Option<CompletionReason> {
        self.completion
    }

    /// The activity Start acts on: the explicit selection, or the first
    /// activity that is not completed yet.
    pub fn effective_selection(&self, session: &SessionState) -> Option<String> {
        session
            .selected_activity_id
            .as_deref()
            .filter(|id| session.activity(id).is_some())
            .map(str::to_string)
            .or_else(|| {
                session
                    .activities
                    .iter()
                    .find(|a| !session.is_completed(&a.id))
                    .map(|a| a.id.clone())
            })
    }

    /// Time for one activity: the in-flight total while it runs, the
    /// persisted `timeSpent` otherwise.
    pub fn activity_time_ms(&self, session: &SessionState, activity_id: &str) -> u64 {
        if self.state.is_active() && self.state.is_current(activity_id) {
            self.state.accumulated_ms()
        } else {
            session.time_spent_ms(activity_id)
        }
    }

    pub fn session_elapsed_ms(&self, session: &SessionState) -> u64 {
        let running = self
            .state
            .current_activity_id
            .as_deref()
            .filter(|_| self.state.is_active());

        let persisted = session
            .activity_progress
            .iter()
            .filter(|p| Some(p.activity_id.as_str()) != running)
            .fold(0u64, |total, p| total.saturating_add(p.time_spent));

        match running {
            Some(_) => persisted.saturating_add(self.state.accumulated_ms()),
            None => persisted,
        }
    }

    pub fn session_elapsed_secs(&self, session: &SessionState) -> u64 {
        ms_to_secs(self.session_elapsed_ms(session))
    }

    /// Seconds left in the budget; negative once it is overrun. `None`
    /// without a duration budget.
    pub fn remaining_secs(&self, session: &SessionState) -> Option<i64> {
        let total = session.time_config.as_ref()?.total_duration_ms()?;
        Some(ms_to_secs(total) as i64 - self.session_elapsed_secs(session) as i64)
    }

    pub fn session_progress(&self, session: &SessionState) -> f64 {
        let total = session
            .time_config
            .as_ref()
            .and_then(|config| config.total_duration_ms());
        percent_of(self.session_elapsed_ms(session), total)
    }

    pub fn activity_progress(&self, session: &SessionState, activity_id: &str) -> f64 {
        let estimate = session.activity(activity_id).and_then(|a| a.estimate_ms());
        percent_of(self.activity_time_ms(session, activity_id), estimate)
    }

    /// Reconciles with an `activeActivityId` the owner changed on its own.
    /// Does nothing when the value is the one this engine last produced.
    pub fn rehydrate(&mut self, host: &mut dyn SessionHost) {
        if self.completion.is_some() {
            return;
        }

        let active = host.session().active_activity_id.clone();
        if active == self.last_seen_active {
            return;
        }
        self.last_seen_active = active.clone();

        let Some(activity_id) = active else {
            return;
        };

        let session = host.session().clone();
        if session.activity(&activity_id).is_none() || session.is_completed(&activity_id) {
            log_warn!(
                "ignoring active activity {} (unknown or already completed)",
                activity_id
            );
            return;
        }

        let now = self.clock.now_ms();
        if self.state.is_current(&activity_id) {
            if self.state.is_paused() {
                self.state.resume(now);
                self.acquire_ticker();
                log_info!("resumed {} from session state", activity_id);
            }
            return;
        }

        let mut next = session;
        let flushed = self.flush_running(&mut next, now);

        let baseline = next.time_spent_ms(&activity_id);
        self.state
            .begin_run(activity_id.clone(), baseline, now, self.clock.wall_now());
        self.restart_ticker();
        log_info!(
            "adopted {} from session state with {} already spent",
            activity_id,
            format_time(ms_to_secs(baseline) as i64)
        );

        if flushed {
            self.publish(host, next);
        }
    }

    pub fn select(&mut self, host: &mut dyn SessionHost, activity_id: &str) {
        if self.completion.is_some() {
            return;
        }
        let Some(activity) = host.session().activity(activity_id) else {
            log_debug!("select ignored: no activity {}", activity_id);
            return;
        };
        log_info!("Selected activity: {}", activity.name);

        let mut next = host.session().clone();
        next.selected_activity_id = Some(activity_id.to_string());
        self.publish(host, next);
    }

    /// Starts the selected activity. Anything still running is flushed
    /// first, the same way a switch does.
    pub fn start(&mut self, host: &mut dyn SessionHost) {
        if self.completion.is_some() {
            return;
        }

        let session = host.session();
        let Some(target) = self.effective_selection(session) else {
            log_debug!("start ignored: nothing selected");
            return;
        };
        if session.is_completed(&target) {
            log_warn!("start ignored: {} is already completed", target);
            return;
        }
        if self.state.is_active() && self.state.is_current(&target) {
            log_debug!("start ignored: {} is already running", target);
            return;
        }

        let mut next = session.clone();
        self.begin_on(&mut next, &target);
        if let Some(activity) = next.activity(&target) {
            log_info!("Started activity: {}", activity.name);
        }
        self.publish(host, next);
    }

    pub fn pause(&mut self, host: &mut dyn SessionHost) {
        if self.completion.is_some() || !self.state.is_active() {
            return;
        }

        let now = self.clock.now_ms();
        self.state.pause(now);
        self.release_ticker();

        let mut next = host.session().clone();
        self.write_current_progress(&mut next);
        next.active_activity_id = None;

        log_info!(
            "Activity paused after {}",
            format_time(self.state.time_elapsed as i64)
        );
        self.publish(host, next);
    }

    pub fn resume(&mut self, host: &mut dyn SessionHost) {
        if self.completion.is_some() || !self.state.is_paused() {
            return;
        }
        let Some(activity_id) = self.state.current_activity_id.clone() else {
            return;
        };
        let session = host.session();
        if session.activity(&activity_id).is_none() || session.is_completed(&activity_id) {
            log_warn!("resume ignored: {} can no longer run", activity_id);
            return;
        }

        let mut next = session.clone();
        self.state.resume(self.clock.now_ms());
        self.acquire_ticker();
        next.active_activity_id = Some(activity_id);

        log_info!("Activity resumed");
        self.publish(host, next);
    }

    /// Marks the current activity done. Completing the last open activity
    /// completes the session.
    pub fn complete(&mut self, host: &mut dyn SessionHost) {
        if self.completion.is_some() {
            return;
        }
        let Some(activity_id) = self.state.current_activity_id.clone() else {
            log_debug!("complete ignored: no current activity");
            return;
        };

        self.state.sync_elapsed_from_anchor(self.clock.now_ms());
        self.release_ticker();

        let mut next = host.session().clone();
        let time_spent = self.state.accumulated_ms();
        let finished_at = self.clock.wall_now();
        {
            let entry = next.progress_entry(&activity_id);
            entry.completed = true;
            entry.time_spent = time_spent;
            entry.end_time = Some(finished_at);
            if entry.start_time.is_none() {
                entry.start_time = self.state.run_started_at;
            }
        }
        next.active_activity_id = None;
        self.state.clear();

        if let Some(activity) = next.activity(&activity_id) {
            log_info!(
                "{} completed in {}",
                activity.name,
                format_time(ms_to_secs(time_spent) as i64)
            );
        }

        if next.all_completed() {
            self.emit(host, next.clone());
            self.signal_completion(host, next, CompletionReason::AllActivitiesCompleted);
            return;
        }

        next.selected_activity_id = None;
        self.publish(host, next);
    }

    /// Moves the timer to another activity, adding the running activity's
    /// time to what it already had.
    pub fn switch_to(&mut self, host: &mut dyn SessionHost, activity_id: &str) {
        if self.completion.is_some() || self.state.is_current(activity_id) {
            return;
        }
        let session = host.session();
        let Some(activity) = session.activity(activity_id) else {
            log_debug!("switch ignored: no activity {}", activity_id);
            return;
        };
        if session.is_completed(activity_id) {
            log_warn!("switch ignored: {} is already completed", activity.name);
            return;
        }
        log_info!("Switched to activity: {}", activity.name);

        let mut next = session.clone();
        self.begin_on(&mut next, activity_id);
        self.publish(host, next);
    }

    /// One timer period elapsed.
    pub fn tick(&mut self, host: &mut dyn SessionHost) {
        if self.completion.is_some() || !self.state.is_active() {
            return;
        }

        self.state.sync_elapsed_from_anchor(self.clock.now_ms());
        let mut next = host.session().clone();
        self.write_current_progress(&mut next);
        self.publish(host, next);
    }

    /// Stops the timer when the engine goes away. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.ticker.is_some() {
            log_debug!("releasing ticker on teardown");
        }
        self.release_ticker();
    }

    fn begin_on(&mut self, next: &mut SessionState, activity_id: &str) {
        let now = self.clock.now_ms();
        self.flush_running(next, now);

        let baseline = next.time_spent_ms(activity_id);
        self.state
            .begin_run(activity_id.to_string(), baseline, now, self.clock.wall_now());
        self.restart_ticker();

        next.selected_activity_id = Some(activity_id.to_string());
        next.active_activity_id = Some(activity_id.to_string());
    }

    /// Writes the running activity's total into `next`. Returns whether
    /// anything was running.
    fn flush_running(&mut self, next: &mut SessionState, now_ms: u64) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state.sync_elapsed_from_anchor(now_ms);
        self.write_current_progress(next);
        true
    }

    fn write_current_progress(&self, next: &mut SessionState) {
        let Some(activity_id) = self.state.current_activity_id.as_deref() else {
            return;
        };
        let accumulated = self.state.accumulated_ms();
        // Entries appear lazily, once there is time to record.
        if accumulated == 0 && next.progress(activity_id).is_none() {
            return;
        }

        let entry = next.progress_entry(activity_id);
        entry.time_spent = accumulated;
        if entry.start_time.is_none() {
            entry.start_time = self.state.run_started_at;
        }
    }

    fn publish(&mut self, host: &mut dyn SessionHost, next: SessionState) {
        self.emit(host, next.clone());
        self.check_session_expiry(host, next);
    }

    fn emit(&mut self, host: &mut dyn SessionHost, next: SessionState) {
        self.last_seen_active = next.active_activity_id.clone();
        host.on_state_change(next);
    }

    fn check_session_expiry(&mut self, host: &mut dyn SessionHost, mut next: SessionState) {
        if self.completion.is_some() {
            return;
        }
        let Some(total) = next
            .time_config
            .as_ref()
            .and_then(|config| config.total_duration_ms())
        else {
            return;
        };

        let elapsed = self.session_elapsed_ms(&next);
        if elapsed < total {
            return;
        }

        if self.state.is_active() {
            self.state.pause(self.clock.now_ms());
            self.write_current_progress(&mut next);
        }
        next.active_activity_id = None;

        log_info!(
            "session budget of {} used up ({} elapsed)",
            format_time(ms_to_secs(total) as i64),
            format_time(ms_to_secs(elapsed) as i64)
        );
        self.signal_completion(host, next, CompletionReason::DurationElapsed);
    }

    fn signal_completion(
        &mut self,
        host: &mut dyn SessionHost,
        final_state: SessionState,
        reason: CompletionReason,
    ) {
        self.completion = Some(reason);
        self.release_ticker();
        self.last_seen_active = final_state.active_activity_id.clone();
        log_info!("session complete ({:?})", reason);
        host.on_complete(final_state);
    }

    fn acquire_ticker(&mut self) {
        if self.ticker.is_none() {
            self.ticker = Some(self.ticks.acquire());
        }
    }

    /// Fresh ticker aligned with a new run's anchor.
    fn restart_ticker(&mut self) {
        self.release_ticker();
        self.acquire_ticker();
    }

    fn release_ticker(&mut self) {
        self.ticker = None;
    }
}

impl Drop for ActivityEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}
