use std::future::Future;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Gate between loop iterations.
pub trait Ticker: Send {
    /// Resolve at the next scheduling opportunity.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

/// Ticks once per display refresh.
///
/// Refreshes that pass while an iteration is still running are skipped,
/// never queued, so a slow estimator lowers the frame rate rather than
/// building a backlog.
#[derive(Debug)]
pub struct RefreshTicker {
    period: Duration,
    interval: Option<Interval>,
}

impl RefreshTicker {
    pub fn new(refresh_hz: u32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / refresh_hz.max(1) as f64),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Ticker for RefreshTicker {
    async fn tick(&mut self) {
        // created lazily: tokio timers need a running runtime
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        interval.tick().await;
    }
}

/// Yields to the runtime and continues. For headless runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateTicker;

impl Ticker for ImmediateTicker {
    async fn tick(&mut self) {
        tokio::task::yield_now().await;
    }
}
