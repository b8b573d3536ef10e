pub mod commands;
pub mod driver;

use chrono::{DateTime, Utc};

use crate::{
    error::{SessionConfigError, SetupError},
    log_info, log_warn,
    models::{Phase, SessionState, TimeMode},
    setup::{self, ActivityInput},
    summary::{self, SessionSummary},
    timer::{
        shortcuts::{self, KeyPress, ShortcutAction},
        view::{render_config_error, ActivityPhaseView},
        ActivityEngine, Clock, SessionHost, TickSource,
    },
};

const ENABLE_LOGS: bool = true;

/// Holds the one `SessionState` of the application. Every phase reads it
/// and replaces it wholesale.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: SessionState,
    completed: Option<SessionState>,
}

impl SessionStore {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            completed: None,
        }
    }

    fn replace(&mut self, state: SessionState) {
        self.state = state;
    }
}

impl SessionHost for SessionStore {
    fn session(&self) -> &SessionState {
        &self.state
    }

    fn on_state_change(&mut self, state: SessionState) {
        self.replace(state);
    }

    fn on_complete(&mut self, state: SessionState) {
        self.completed = Some(state);
    }
}

/// Phase machine around the timing engine: loading, setup, activity,
/// completed, and back to setup on restart.
pub struct App<C, T> {
    store: SessionStore,
    engine: Option<ActivityEngine>,
    config_error: Option<SessionConfigError>,
    summary: Option<SessionSummary>,
    shortcuts_enabled: bool,
    default_duration_minutes: Option<u64>,
    clock: C,
    ticks: T,
}

impl<C, T> App<C, T>
where
    C: Clock + Clone + 'static,
    T: TickSource + Clone + 'static,
{
    pub fn new(clock: C, ticks: T) -> Self {
        Self {
            store: SessionStore::default(),
            engine: None,
            config_error: None,
            summary: None,
            shortcuts_enabled: true,
            default_duration_minutes: None,
            clock,
            ticks,
        }
    }

    /// Starts from an existing session. A session already in the activity
    /// phase gets its engine mounted right away.
    pub fn with_session(clock: C, ticks: T, session: SessionState) -> Self {
        let mut app = Self::new(clock, ticks);
        let phase = session.phase;
        app.store = SessionStore::new(session);
        match phase {
            Phase::Activity => app.mount_engine(),
            Phase::Completed => {
                app.summary = Some(summary::summarize(app.store.session()));
            }
            Phase::Loading | Phase::Setup => {}
        }
        app
    }

    pub fn session(&self) -> &SessionState {
        self.store.session()
    }

    pub fn phase(&self) -> Phase {
        self.store.session().phase
    }

    pub fn engine(&self) -> Option<&ActivityEngine> {
        self.engine.as_ref()
    }

    pub fn config_error(&self) -> Option<&SessionConfigError> {
        self.config_error.as_ref()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn set_shortcuts_enabled(&mut self, enabled: bool) {
        self.shortcuts_enabled = enabled;
    }

    /// Duration preset applied whenever a setup opens without a time config.
    pub fn set_default_duration_minutes(&mut self, minutes: u64) {
        self.default_duration_minutes = (minutes > 0).then_some(minutes);
    }

    pub fn finish_loading(&mut self) {
        if self.phase() != Phase::Loading {
            return;
        }
        let mut next = self.with_default_time(self.store.session());
        next.phase = Phase::Setup;
        self.store.replace(next);
        log_info!("loading finished, entering setup");
    }

    pub fn set_duration_minutes(&mut self, minutes: i64) -> Result<(), SetupError> {
        let next = setup::set_duration_minutes(self.store.session(), minutes)?;
        self.store.replace(next);
        Ok(())
    }

    pub fn set_deadline(&mut self, deadline: DateTime<Utc>) {
        let next = setup::set_deadline(self.store.session(), deadline);
        self.store.replace(next);
    }

    pub fn add_activity(&mut self, input: &ActivityInput) -> Result<String, SetupError> {
        let (next, id) = setup::add_activity(self.store.session(), input, &mut rand::thread_rng())?;
        self.store.replace(next);
        Ok(id)
    }

    pub fn edit_activity(
        &mut self,
        activity_id: &str,
        input: &ActivityInput,
    ) -> Result<(), SetupError> {
        let next = setup::edit_activity(self.store.session(), activity_id, input)?;
        self.store.replace(next);
        Ok(())
    }

    pub fn delete_activity(&mut self, activity_id: &str) -> Result<(), SetupError> {
        let next = setup::delete_activity(self.store.session(), activity_id)?;
        self.store.replace(next);
        Ok(())
    }

    /// Leaves setup and mounts the engine.
    pub fn begin(&mut self) -> Result<(), SetupError> {
        let next = setup::begin_session(self.store.session(), self.clock.wall_now())?;
        self.store.replace(next);
        self.mount_engine();
        Ok(())
    }

    pub fn select(&mut self, activity_id: &str) {
        self.with_engine(|engine, store| engine.select(store, activity_id));
    }

    pub fn start(&mut self) {
        self.with_engine(|engine, store| engine.start(store));
    }

    pub fn pause(&mut self) {
        self.with_engine(|engine, store| engine.pause(store));
    }

    pub fn resume(&mut self) {
        self.with_engine(|engine, store| engine.resume(store));
    }

    pub fn complete(&mut self) {
        self.with_engine(|engine, store| engine.complete(store));
    }

    pub fn switch_to(&mut self, activity_id: &str) {
        self.with_engine(|engine, store| engine.switch_to(store, activity_id));
    }

    pub fn tick(&mut self) {
        self.with_engine(|engine, store| engine.tick(store));
    }

    pub fn key(&mut self, press: KeyPress) -> Option<ShortcutAction> {
        if !self.shortcuts_enabled {
            return None;
        }
        let mut action = None;
        self.with_engine(|engine, store| action = shortcuts::dispatch(engine, store, press));
        action
    }

    /// Throws the finished (or abandoned) session away and opens a fresh
    /// setup.
    pub fn restart(&mut self) {
        self.engine = None;
        self.config_error = None;
        self.summary = None;
        let fresh = SessionState {
            phase: Phase::Setup,
            ..SessionState::default()
        };
        self.store = SessionStore::new(self.with_default_time(&fresh));
        log_info!("new session");
    }

    /// Text for whatever phase the app is in.
    pub fn render(&self) -> String {
        match self.phase() {
            Phase::Loading => "Loading...".to_string(),
            Phase::Setup => self.render_setup(),
            Phase::Activity => match (&self.engine, &self.config_error) {
                (_, Some(error)) => render_config_error(error),
                (Some(engine), None) => {
                    ActivityPhaseView::build(engine, self.store.session()).to_string()
                }
                (None, None) => "Activity phase is not running".to_string(),
            },
            Phase::Completed => self
                .summary
                .as_ref()
                .map(|summary| summary.to_string())
                .unwrap_or_else(|| "Session Complete".to_string()),
        }
    }

    fn render_setup(&self) -> String {
        let session = self.store.session();
        let mut lines = vec!["Session Setup".to_string()];
        match &session.time_config {
            Some(config) => match config.total_duration_ms() {
                Some(_) => lines.push(format!(
                    "  Duration: {} min",
                    setup::duration_minutes(config).unwrap_or(0)
                )),
                None => lines.push(format!(
                    "  Deadline: {}",
                    config
                        .deadline
                        .map(|d| d.to_rfc3339())
                        .unwrap_or_else(|| "not set".to_string())
                )),
            },
            None => lines.push("  Time: not configured".to_string()),
        }
        if session.activities.is_empty() {
            lines.push("  No activities yet".to_string());
        }
        for activity in &session.activities {
            let estimate = activity
                .estimate_ms()
                .map(|ms| format!(" ~{} min", ms / crate::utils::time::MS_PER_MINUTE))
                .unwrap_or_default();
            lines.push(format!("  [{}] {}{}", activity.id, activity.name, estimate));
        }
        lines.push(format!(
            "  Ready to begin: {}",
            if setup::is_session_valid(session) { "yes" } else { "no" }
        ));
        lines.join("\n")
    }

    fn with_default_time(&self, session: &SessionState) -> SessionState {
        match (self.default_duration_minutes, &session.time_config) {
            (Some(minutes), None) => {
                setup::set_time_mode(session, TimeMode::Duration, minutes, None)
            }
            _ => session.clone(),
        }
    }

    fn mount_engine(&mut self) {
        self.engine = None;
        self.config_error = None;
        match ActivityEngine::mount(
            &mut self.store,
            Box::new(self.clock.clone()),
            Box::new(self.ticks.clone()),
        ) {
            Ok(engine) => {
                self.engine = Some(engine);
                self.settle();
            }
            Err(error) => {
                log_warn!("cannot start activity phase: {}", error);
                self.config_error = Some(error);
            }
        }
    }

    fn with_engine(&mut self, op: impl FnOnce(&mut ActivityEngine, &mut SessionStore)) {
        if self.phase() != Phase::Activity {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        op(engine, &mut self.store);
        self.settle();
    }

    /// Moves to the completion phase once the engine has signalled.
    fn settle(&mut self) {
        let Some(mut final_state) = self.store.completed.take() else {
            return;
        };
        if let Some(mut engine) = self.engine.take() {
            engine.teardown();
        }
        final_state.phase = Phase::Completed;
        let summary = summary::summarize(&final_state);
        log_info!(
            "session finished: {}",
            summary.statistics.completion_status.label()
        );
        self.summary = Some(summary);
        self.store.replace(final_state);
    }
}
