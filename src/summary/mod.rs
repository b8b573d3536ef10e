mod types;

pub use types::{ActivityBreakdown, CompletionStatus, SessionStatistics, SessionSummary};

use std::fmt;

use crate::{
    models::SessionState,
    utils::time::{format_duration, MS_PER_MINUTE},
};

/// Actual time within this margin of the plan counts as on time.
const ON_TIME_TOLERANCE_MS: u64 = 2 * MS_PER_MINUTE;

pub fn statistics(session: &SessionState) -> SessionStatistics {
    let planned = session
        .activities
        .iter()
        .fold(0u64, |sum, a| sum.saturating_add(a.estimated_duration.unwrap_or(0)));
    let actual = session.total_time_spent_ms();

    let completion_status = if actual.saturating_add(ON_TIME_TOLERANCE_MS) < planned {
        CompletionStatus::Early
    } else if actual > planned.saturating_add(ON_TIME_TOLERANCE_MS) {
        CompletionStatus::Overtime
    } else {
        CompletionStatus::OnTime
    };

    let efficiency = if planned == 0 || actual == 0 {
        0
    } else {
        (planned as f64 / actual as f64 * 100.0).round() as u32
    };

    SessionStatistics {
        total_planned_time: planned,
        total_actual_time: actual,
        time_spent_on_activities: actual,
        overtime_amount: actual.saturating_sub(planned),
        completion_status,
        efficiency,
    }
}

pub fn breakdown(session: &SessionState) -> Vec<ActivityBreakdown> {
    session
        .activities
        .iter()
        .map(|activity| {
            let planned = activity.estimated_duration.unwrap_or(0);
            let actual = session.time_spent_ms(&activity.id);
            ActivityBreakdown {
                id: activity.id.clone(),
                name: activity.name.clone(),
                color: activity.color.clone(),
                planned_time: planned,
                actual_time: actual,
                difference: actual as i64 - planned as i64,
                completed: session.is_completed(&activity.id),
            }
        })
        .collect()
}

pub fn summarize(session: &SessionState) -> SessionSummary {
    SessionSummary {
        statistics: statistics(session),
        activities: breakdown(session),
        has_progress: !session.activity_progress.is_empty(),
    }
}

/// "On time" under a minute of difference, otherwise whole minutes under or
/// over.
pub fn difference_label(difference_ms: i64) -> String {
    let minutes = difference_ms.unsigned_abs() / MS_PER_MINUTE;
    if minutes == 0 {
        "On time".to_string()
    } else if difference_ms < 0 {
        format!("{minutes} min under")
    } else {
        format!("{minutes} min over")
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.statistics;
        writeln!(f, "Session Complete")?;
        if !self.has_progress {
            return writeln!(f, "  No activities completed");
        }

        writeln!(f, "  Session Status: {}", stats.completion_status.label())?;
        writeln!(f, "  Planned: {}", format_duration(stats.total_planned_time))?;
        writeln!(f, "  Actual: {}", format_duration(stats.total_actual_time))?;
        if stats.overtime_amount > 0 {
            writeln!(f, "  Overtime: {}", format_duration(stats.overtime_amount))?;
        }
        writeln!(f, "  Efficiency: {}%", stats.efficiency)?;

        for activity in &self.activities {
            writeln!(
                f,
                "  {} {} / {} ({})",
                activity.name,
                format_duration(activity.actual_time),
                format_duration(activity.planned_time),
                difference_label(activity.difference)
            )?;
        }
        Ok(())
    }
}
