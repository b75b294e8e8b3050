//! Scheduler configuration.

use std::time::Duration;

use tracing::warn;

/// What to do when a tick wakes up late.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TickPolicy {
    /// Forget the missed ticks and schedule the next one from now.
    #[default]
    Skip,
    /// Keep the original cadence; the next tick fires at its planned time
    /// even if that is already in the past.
    Drop,
}

/// Configuration for a [`TickScheduler`](crate::TickScheduler).
#[derive(Debug, Clone, PartialEq)]
pub struct TickConfig {
    /// Ticks per second. Clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    /// Overrun handling.
    pub policy: TickPolicy,
    /// Fraction of the tick budget (0.0–1.0) above which a slow tick is
    /// logged.
    pub budget_warn_threshold: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
        }
    }
}

impl TickConfig {
    /// One tick per display frame.
    pub const DEFAULT_TICK_RATE_HZ: u32 = 60;
    /// Upper bound on the tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 240;

    /// Config for a specific rate with default policy and threshold.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// Called by [`TickScheduler::new`](crate::TickScheduler::new).
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            let clamped = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
            warn!(
                rate = self.tick_rate_hz,
                clamped, "tick_rate_hz out of range, clamping"
            );
            self.tick_rate_hz = clamped;
        }
        if !self.budget_warn_threshold.is_finite() {
            self.budget_warn_threshold = 0.80;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Duration of one tick at the configured rate.
    ///
    /// Uses the clamped rate, so a zero rate yields one second rather than
    /// dividing by zero.
    pub fn tick_duration(&self) -> Duration {
        let rate = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
        Duration::from_secs_f64(1.0 / f64::from(rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sixty_hz_skip() {
        let cfg = TickConfig::default();
        assert_eq!(cfg.tick_rate_hz, 60);
        assert_eq!(cfg.policy, TickPolicy::Skip);
    }

    #[test]
    fn test_validated_clamps_rate_and_threshold() {
        let cfg = TickConfig {
            tick_rate_hz: 10_000,
            policy: TickPolicy::Drop,
            budget_warn_threshold: 3.0,
        }
        .validated();
        assert_eq!(cfg.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
        assert_eq!(cfg.budget_warn_threshold, 1.0);
        assert_eq!(cfg.policy, TickPolicy::Drop);

        let cfg = TickConfig::with_rate(0).validated();
        assert_eq!(cfg.tick_rate_hz, 1);
    }

    #[test]
    fn test_validated_replaces_nan_threshold() {
        let cfg = TickConfig {
            budget_warn_threshold: f64::NAN,
            ..Default::default()
        }
        .validated();
        assert_eq!(cfg.budget_warn_threshold, 0.80);
    }
}
