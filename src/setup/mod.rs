//! Setup phase operations. Each takes the current session and returns the
//! replacement the owner should store.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::SetupError,
    log_info,
    models::{Activity, ActivityStatus, Phase, SessionState, TimeConfig, TimeMode},
    utils::time::{minutes_to_ms, MS_PER_MINUTE},
};

const ENABLE_LOGS: bool = true;

/// Form input for creating or editing an activity.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimate_minutes: Option<u64>,
}

impl ActivityInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_estimate_minutes(mut self, minutes: u64) -> Self {
        self.estimate_minutes = Some(minutes);
        self
    }

    fn validated_name(&self) -> Result<String, SetupError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SetupError::MissingActivityName);
        }
        Ok(name.to_string())
    }

    fn cleaned_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}

pub fn random_color<R: Rng>(rng: &mut R) -> String {
    format!("hsl({}, 70%, 50%)", rng.gen_range(0..360))
}

/// Switches between duration and deadline budgets, carrying over the form
/// values for the chosen mode.
pub fn set_time_mode(
    session: &SessionState,
    mode: TimeMode,
    duration_minutes: u64,
    deadline: Option<DateTime<Utc>>,
) -> SessionState {
    let config = match mode {
        TimeMode::Duration => TimeConfig::duration_ms(minutes_to_ms(duration_minutes)),
        TimeMode::Deadline => TimeConfig {
            mode: TimeMode::Deadline,
            duration: None,
            deadline,
        },
    };
    SessionState {
        time_config: Some(config),
        ..session.clone()
    }
}

pub fn set_duration_minutes(
    session: &SessionState,
    minutes: i64,
) -> Result<SessionState, SetupError> {
    if minutes <= 0 {
        return Err(SetupError::InvalidDuration);
    }
    Ok(SessionState {
        time_config: Some(TimeConfig::duration_ms(minutes_to_ms(minutes as u64))),
        ..session.clone()
    })
}

pub fn set_deadline(session: &SessionState, deadline: DateTime<Utc>) -> SessionState {
    SessionState {
        time_config: Some(TimeConfig::deadline(deadline)),
        ..session.clone()
    }
}

/// Minutes shown in the duration field for an existing config.
pub fn duration_minutes(config: &TimeConfig) -> Option<u64> {
    config.duration.map(|ms| ms / MS_PER_MINUTE)
}

pub fn add_activity<R: Rng>(
    session: &SessionState,
    input: &ActivityInput,
    rng: &mut R,
) -> Result<(SessionState, String), SetupError> {
    let name = input.validated_name()?;
    let id = format!("activity-{}", Uuid::new_v4());

    let activity = Activity {
        id: id.clone(),
        name,
        description: input.cleaned_description(),
        estimated_duration: input.estimate_minutes.map(minutes_to_ms),
        status: ActivityStatus::Pending,
        start_time: None,
        end_time: None,
        color: random_color(rng),
    };
    log_info!("Activity added: {}", activity.name);

    let mut next = session.clone();
    next.activities.push(activity);
    Ok((next, id))
}

/// Replaces name, description and estimate; id and color are kept.
pub fn edit_activity(
    session: &SessionState,
    activity_id: &str,
    input: &ActivityInput,
) -> Result<SessionState, SetupError> {
    let name = input.validated_name()?;
    let mut next = session.clone();
    let activity = next
        .activities
        .iter_mut()
        .find(|a| a.id == activity_id)
        .ok_or_else(|| SetupError::UnknownActivity(activity_id.to_string()))?;

    activity.name = name;
    activity.description = input.cleaned_description();
    activity.estimated_duration = input.estimate_minutes.map(minutes_to_ms);
    log_info!("Activity updated: {}", activity.name);

    Ok(next)
}

pub fn delete_activity(
    session: &SessionState,
    activity_id: &str,
) -> Result<SessionState, SetupError> {
    if session.activity(activity_id).is_none() {
        return Err(SetupError::UnknownActivity(activity_id.to_string()));
    }

    let mut next = session.clone();
    next.activities.retain(|a| a.id != activity_id);
    next.activity_progress.retain(|p| p.activity_id != activity_id);
    if next.selected_activity_id.as_deref() == Some(activity_id) {
        next.selected_activity_id = None;
    }
    if next.active_activity_id.as_deref() == Some(activity_id) {
        next.active_activity_id = None;
    }
    log_info!("Activity deleted: {}", activity_id);

    Ok(next)
}

pub fn is_session_valid(session: &SessionState) -> bool {
    !session.activities.is_empty() && session.time_config.is_some()
}

/// Stamps the start time and hands the session to the activity phase.
pub fn begin_session(
    session: &SessionState,
    now: DateTime<Utc>,
) -> Result<SessionState, SetupError> {
    if !is_session_valid(session) {
        return Err(SetupError::IncompleteSession);
    }
    Ok(SessionState {
        phase: Phase::Activity,
        session_start_time: Some(now),
        ..session.clone()
    })
}
