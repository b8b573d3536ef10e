use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};

use crate::log_debug;

const ENABLE_LOGS: bool = false;

/// A live periodic timer. Dropping the guard stops it.
pub struct TickerGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl TickerGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Hands out periodic timers to the engine.
pub trait TickSource: Send {
    fn acquire(&mut self) -> TickerGuard;
}

/// Tokio interval that sends a unit message per period. Ticks land in the
/// same channel the event loop reads, so a tick is handled like any other
/// event.
#[derive(Clone)]
pub struct IntervalTicker {
    period: Duration,
    sender: mpsc::UnboundedSender<()>,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { period, sender }, receiver)
    }
}

impl TickSource for IntervalTicker {
    fn acquire(&mut self) -> TickerGuard {
        let period = self.period;
        let sender = self.sender.clone();

        let handle = tokio::spawn(async move {
            // First tick one period from now, not immediately.
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if sender.send(()).is_err() {
                    break;
                }
            }
        });
        log_debug!("ticker spawned ({} ms)", period.as_millis());

        TickerGuard::new(move || handle.abort())
    }
}

/// Ticker for tests and scripted runs: never fires on its own, only counts
/// how many timers are alive.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    live: Arc<AtomicUsize>,
    acquired: Arc<AtomicUsize>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn total_acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

impl TickSource for ManualTicker {
    fn acquire(&mut self) -> TickerGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.acquired.fetch_add(1, Ordering::SeqCst);
        let live = self.live.clone();
        TickerGuard::new(move || {
            live.fetch_sub(1, Ordering::SeqCst);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_guard_releases_manual_ticker() {
        let mut ticker = ManualTicker::new();
        let guard = ticker.acquire();
        assert_eq!(ticker.live(), 1);

        drop(guard);
        assert_eq!(ticker.live(), 0);
        assert_eq!(ticker.total_acquired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_ticker_fires_after_one_period() {
        let (mut ticker, mut ticks) = IntervalTicker::new(Duration::from_secs(1));
        let guard = ticker.acquire();

        time::sleep(Duration::from_millis(500)).await;
        assert!(ticks.try_recv().is_err());

        time::sleep(Duration::from_millis(600)).await;
        assert!(ticks.try_recv().is_ok());

        drop(guard);
    }
}
