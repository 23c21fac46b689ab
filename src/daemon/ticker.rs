//! Fixed-rate driver for the scheduler.

use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use super::scheduler::BreakScheduler;

/// How often the scheduler advances; every tick is one second of progress.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Calls [`BreakScheduler::tick`] at a fixed rate.
///
/// Late ticks are skipped rather than bunched up, so a stalled runtime
/// never produces a burst of ticks.
pub struct Ticker {
    scheduler: Arc<BreakScheduler>,
    period: Duration,
}

impl Ticker {
    pub fn new(scheduler: Arc<BreakScheduler>) -> Self {
        Self::with_period(scheduler, TICK_PERIOD)
    }

    /// Uses a custom period. Each tick still counts as one second.
    pub fn with_period(scheduler: Arc<BreakScheduler>, period: Duration) -> Self {
        Self { scheduler, period }
    }

    /// Ticks forever, or `max_ticks` times when given.
    ///
    /// Returns the number of ticks delivered.
    pub async fn run(&self, max_ticks: Option<u64>) -> u64 {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // the first tick completes immediately
        ticker.tick().await;
        info!(period_ms = self.period.as_millis() as u64, "Ticker started");

        let mut count = 0;
        while max_ticks.map_or(true, |max| count < max) {
            ticker.tick().await;
            self.scheduler.tick();
            count += 1;
        }

        debug!(count, "Ticker finished");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::SchedulerRegistry;
    use crate::types::{BreakCategory, BreakConfig, BreakProgress, WallClock};
    use tokio::sync::mpsc;

    fn scheduler() -> Arc<BreakScheduler> {
        let (tx, _rx) = mpsc::unbounded_channel();
        let breaks = BreakCategory::ALL
            .into_iter()
            .map(|c| BreakProgress::new(BreakConfig::default_for(c)));
        Arc::new(SchedulerRegistry::new().create(breaks, tx).unwrap())
    }

    #[tokio::test]
    async fn test_runs_max_ticks() {
        let scheduler = scheduler();
        let ticker = Ticker::with_period(Arc::clone(&scheduler), Duration::from_millis(5));

        assert_eq!(ticker.run(Some(3)).await, 3);
        assert_eq!(
            scheduler.get(BreakCategory::SmallBreak).remaining(),
            WallClock::from_seconds(20 * 60 - 3)
        );
    }

    #[tokio::test]
    async fn test_zero_ticks() {
        let scheduler = scheduler();
        let ticker = Ticker::with_period(Arc::clone(&scheduler), Duration::from_millis(5));

        assert_eq!(ticker.run(Some(0)).await, 0);
        assert_eq!(
            scheduler.get(BreakCategory::SmallBreak).remaining(),
            WallClock::from_minutes(20)
        );
    }

    #[tokio::test]
    async fn test_stopped_scheduler_ignores_ticks() {
        let scheduler = scheduler();
        scheduler.set_stopped(true);
        let ticker = Ticker::with_period(Arc::clone(&scheduler), Duration::from_millis(5));

        ticker.run(Some(2)).await;
        assert_eq!(
            scheduler.get(BreakCategory::SmallBreak).remaining(),
            WallClock::from_minutes(20)
        );
    }

    #[test]
    fn test_default_period() {
        assert_eq!(TICK_PERIOD, Duration::from_secs(1));
    }
}
