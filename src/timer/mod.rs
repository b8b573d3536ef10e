pub mod clock;
pub mod controller;
pub mod shortcuts;
pub mod state;
pub mod ticker;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{validate_session, ActivityEngine, CompletionReason, SessionHost};
pub use state::{TimerState, TimerStatus};
pub use ticker::{IntervalTicker, ManualTicker, TickSource, TickerGuard};
