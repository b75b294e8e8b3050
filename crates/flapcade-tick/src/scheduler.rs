//! The scheduler itself.

use std::time::{Duration, Instant};

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

use crate::{TickConfig, TickPolicy};

/// Information about one fired tick, returned by
/// [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// Monotonically increasing tick number, starting at 1.
    pub tick: u64,
    /// Fixed step for this tick (always `1 / tick_rate`). Simulations use
    /// this, not wall-clock time, so replays stay deterministic.
    pub dt: Duration,
    /// `true` if the scheduler woke up more than 10% of a tick late.
    pub overrun: bool,
    /// Whole ticks that were skipped because of the overrun.
    pub ticks_skipped: u64,
}

/// Counters maintained by the scheduler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
    /// Slowest tick body reported via [`TickScheduler::record_tick_end`].
    pub max_tick_time: Duration,
    /// Budget utilization of the last reported tick (>1.0 means overrun).
    pub last_utilization: f64,
}

/// Fixed-rate tick scheduler. One per game loop.
#[derive(Debug)]
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Duration,
    tick_count: u64,
    next_tick: TokioInstant,
    /// Set by `wait_for_tick`, taken by `record_tick_end`.
    tick_start: Option<Instant>,
    paused: bool,
    stats: TickStats,
}

impl TickScheduler {
    /// Creates a scheduler whose first tick fires one tick from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        debug!(
            rate_hz = config.tick_rate_hz,
            budget_ms = tick_duration.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick scheduler created"
        );

        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick: TokioInstant::now() + tick_duration,
            tick_start: None,
            paused: false,
            stats: TickStats::default(),
        }
    }

    /// Scheduler for a specific rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits until the next tick is due.
    ///
    /// While paused this future never resolves; other `select!` branches
    /// keep running.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.paused {
            return std::future::pending().await;
        }

        let scheduled = self.next_tick;
        let dt = self.tick_duration;
        time::sleep_until(scheduled).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        let late_by = now.saturating_duration_since(scheduled);
        let overrun = late_by > dt / 10;
        let mut ticks_skipped = 0;

        self.next_tick = match self.config.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped = (late_by.as_nanos() / dt.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "tick overrun, skipping ahead"
                        );
                    }
                }
                now + dt
            }
            TickPolicy::Drop => {
                if overrun {
                    warn!(
                        tick = self.tick_count,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick overrun, keeping original cadence"
                    );
                }
                scheduled + dt
            }
        };

        self.stats.total_ticks += 1;
        self.stats.total_skipped += ticks_skipped;
        if overrun {
            self.stats.total_overruns += 1;
        }

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt,
            overrun,
            ticks_skipped,
        }
    }

    /// Records that the work for the current tick has finished.
    ///
    /// Without this call no budget warnings are emitted.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        let utilization = elapsed.as_secs_f64() / self.tick_duration.as_secs_f64();

        self.stats.last_utilization = utilization;
        self.stats.max_tick_time = self.stats.max_tick_time.max(elapsed);

        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.tick_duration.as_secs_f64() * 1000.0,
                "tick body near or over budget"
            );
        }
    }

    /// Pauses the loop. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Resumes after a pause. The next tick fires one full tick from now.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_tick = TokioInstant::now() + self.tick_duration;
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}
