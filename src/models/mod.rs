mod activity;
mod progress;
mod session;
mod time_config;

pub use activity::{Activity, ActivityStatus};
pub use progress::ActivityProgress;
pub use session::{Phase, SessionState};
pub use time_config::{TimeConfig, TimeMode};
