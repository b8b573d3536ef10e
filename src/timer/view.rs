//! Display data for the activity phase. Everything here is derived from the
//! session plus the engine's transient state; nothing is stored.

use std::fmt;

use serde::Serialize;

use crate::{
    error::SessionConfigError,
    models::SessionState,
    utils::time::{format_time, ProgressTier},
};

use super::ActivityEngine;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgressView {
    /// `None` renders as "Unknown" (no duration budget).
    pub remaining: Option<String>,
    pub elapsed: String,
    pub percent: u32,
    pub tier: ProgressTier,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub percent: f64,
    pub is_selected: bool,
    pub is_current: bool,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    pub start: bool,
    pub pause: bool,
    pub resume: bool,
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwitchTarget {
    pub id: String,
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentActivityView {
    pub name: String,
    pub elapsed: String,
    pub paused: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPhaseView {
    pub session: SessionProgressView,
    pub selected: Option<String>,
    pub current: Option<CurrentActivityView>,
    pub timeline: Vec<ActivityRow>,
    pub controls: Controls,
    pub switch_targets: Vec<SwitchTarget>,
}

impl ActivityPhaseView {
    pub fn build(engine: &ActivityEngine, session: &SessionState) -> Self {
        let selected_id = engine.effective_selection(session);
        let current_id = engine.current_activity_id();
        let is_active = engine.is_active();

        let percent = engine.session_progress(session);
        let progress = SessionProgressView {
            remaining: engine.remaining_secs(session).map(format_time),
            elapsed: format_time(engine.session_elapsed_secs(session) as i64),
            percent: percent.round() as u32,
            tier: ProgressTier::from_percent(percent),
        };

        let timeline = session
            .activities
            .iter()
            .map(|activity| ActivityRow {
                id: activity.id.clone(),
                name: activity.name.clone(),
                color: activity.color.clone(),
                percent: engine.activity_progress(session, &activity.id),
                is_selected: selected_id.as_deref() == Some(activity.id.as_str()),
                is_current: current_id == Some(activity.id.as_str()),
                is_completed: session.is_completed(&activity.id),
            })
            .collect();

        let current = current_id.and_then(|id| session.activity(id)).map(|activity| {
            CurrentActivityView {
                name: activity.name.clone(),
                elapsed: format_time(engine.time_elapsed() as i64),
                paused: !is_active,
            }
        });

        let controls = Controls {
            start: current_id.is_none() && selected_id.is_some(),
            pause: current_id.is_some() && is_active,
            resume: current_id.is_some() && !is_active,
            complete: current_id.is_some(),
        };

        let switch_targets = if session.activities.len() > 1 {
            session
                .activities
                .iter()
                .filter(|activity| current_id != Some(activity.id.as_str()))
                .map(|activity| SwitchTarget {
                    id: activity.id.clone(),
                    name: activity.name.clone(),
                    enabled: !session.is_completed(&activity.id),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            session: progress,
            selected: selected_id.and_then(|id| session.activity(&id).map(|a| a.name.clone())),
            current,
            timeline,
            controls,
            switch_targets,
        }
    }
}

impl fmt::Display for ActivityPhaseView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Active Session")?;
        writeln!(
            f,
            "  Time Remaining: {}",
            self.session.remaining.as_deref().unwrap_or("Unknown")
        )?;
        writeln!(f, "  Session Elapsed: {}", self.session.elapsed)?;
        writeln!(
            f,
            "  Progress: {}% ({})",
            self.session.percent,
            self.session.tier.as_str()
        )?;

        writeln!(f, "Timeline")?;
        for row in &self.timeline {
            let mut badges = Vec::new();
            if row.is_selected {
                badges.push("selected");
            }
            if row.is_current {
                badges.push("current");
            }
            if row.is_completed {
                badges.push("done");
            }
            writeln!(
                f,
                "  [{}] {} {:>3.0}% {}",
                row.id,
                row.name,
                row.percent,
                badges.join(",")
            )?;
        }

        writeln!(
            f,
            "Selected: {}",
            self.selected.as_deref().unwrap_or("None")
        )?;
        if let Some(current) = &self.current {
            writeln!(
                f,
                "Current: {} - Elapsed: {}{}",
                current.name,
                current.elapsed,
                if current.paused { " (paused)" } else { "" }
            )?;
        }

        let mut actions = Vec::new();
        if self.controls.start {
            actions.push("start");
        }
        if self.controls.pause {
            actions.push("pause");
        }
        if self.controls.resume {
            actions.push("resume");
        }
        if self.controls.complete {
            actions.push("complete");
        }
        writeln!(f, "Actions: {}", actions.join(" "))?;

        if !self.switch_targets.is_empty() {
            let targets: Vec<String> = self
                .switch_targets
                .iter()
                .map(|t| {
                    if t.enabled {
                        format!("{} ({})", t.name, t.id)
                    } else {
                        format!("{} (Completed)", t.name)
                    }
                })
                .collect();
            writeln!(f, "Switch to: {}", targets.join(", "))?;
        }
        Ok(())
    }
}

/// Static view shown instead of the activity phase when the session is
/// unusable.
pub fn render_config_error(error: &SessionConfigError) -> String {
    format!("{}\n  {}", error.title(), error)
}
