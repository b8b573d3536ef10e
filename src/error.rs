//! Error types for session operations.

/// A session that cannot enter the activity phase. These are terminal for
/// the engine: the shell shows the error view and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionConfigError {
    #[error("Session configuration is missing. Please restart the session.")]
    MissingTimeConfig,

    #[error("No activities were configured for this session.")]
    NoActivities,

    #[error("Session start time is not available.")]
    MissingStartTime,
}

impl SessionConfigError {
    /// Heading for the static error view.
    pub fn title(&self) -> &'static str {
        match self {
            SessionConfigError::MissingTimeConfig => "Session Configuration Error",
            SessionConfigError::NoActivities => "No Activities Defined",
            SessionConfigError::MissingStartTime => "Session Start Time Missing",
        }
    }
}

/// Validation failures from the setup form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("Duration must be greater than 0")]
    InvalidDuration,

    #[error("Activity name is required")]
    MissingActivityName,

    #[error("activity {0} not found")]
    UnknownActivity(String),

    #[error("a session needs at least one activity and a time configuration")]
    IncompleteSession,
}
