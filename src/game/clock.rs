//! Tick scheduling
//!
//! The engine never waits on time itself. A driver owns a `TickClock`, awaits
//! `tick()`, advances the engine, then calls `rearm` with the engine's current
//! interval. A changed interval therefore applies from the next wait onward
//! and never shortens or stretches a wait already in progress.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

pub struct TickClock {
    period: Duration,
    interval: Interval,
}

impl TickClock {
    /// Create a clock whose first tick fires one full `period` from now
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: Self::arm(period),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    /// Adopt `period` for future waits; returns true if it differed
    pub fn rearm(&mut self, period: Duration) -> bool {
        if period == self.period {
            return false;
        }

        debug!(
            from_ms = self.period.as_millis() as u64,
            to_ms = period.as_millis() as u64,
            "tick clock re-armed"
        );
        self.period = period;
        self.interval = Self::arm(period);
        true
    }

    /// Start a fresh wait of one period without changing it
    pub fn restart(&mut self) {
        self.interval = Self::arm(self.period);
    }

    fn arm(period: Duration) -> Interval {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_period() {
        let start = Instant::now();
        let mut clock = TickClock::new(Duration::from_millis(200));

        clock.tick().await;

        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_applies_from_next_wait() {
        let start = Instant::now();
        let mut clock = TickClock::new(Duration::from_millis(200));

        clock.tick().await;
        assert!(clock.rearm(Duration::from_millis(150)));
        assert_eq!(clock.period(), Duration::from_millis(150));

        clock.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(350));

        clock.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_with_same_period_keeps_schedule() {
        let start = Instant::now();
        let mut clock = TickClock::new(Duration::from_millis(100));

        clock.tick().await;
        tokio::time::advance(Duration::from_millis(40)).await;
        assert!(!clock.rearm(Duration::from_millis(100)));

        clock.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_delays_next_tick() {
        let start = Instant::now();
        let mut clock = TickClock::new(Duration::from_millis(100));

        tokio::time::advance(Duration::from_millis(60)).await;
        clock.restart();

        clock.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(160));
    }
}
