//! Async driver that runs a [`Simulation`] on the Tokio clock.
//!
//! # Architecture
//!
//! ```text
//!   GameLoop (handle)                     game task
//!   ─────────────────                     ─────────
//!   flap()   ─┐
//!   pause()   ├─ mpsc<Control> ─────────→ sim.flap() / scheduler.pause()
//!   resume() ─┘                           │
//!                        TickScheduler ──→ sim.advance(dt)
//!                                         │
//!   state() ←── watch<GameState> ─────────┤
//!   game_over() ←── oneshot<GameOver> ────┘  (sent at most once)
//!   stop() ──── Arc<AtomicBool> ──────────→ checked every tick
//! ```
//!
//! The task owns the simulation exclusively. Flaps that arrive between two
//! ticks are applied before the next one; ticks never overlap because a
//! single task runs them in order. While paused no tick fires and flaps are
//! discarded, so a run can't be steered blind.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use flapcade_tick::{TickConfig, TickScheduler};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::{GameOver, GameState, Simulation};

/// Inputs buffered between ticks before further presses are dropped.
const CONTROL_BUFFER: usize = 16;

/// Inputs from the handle to the game task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Flap,
    Pause,
    Resume,
}

/// Handle to a running game task.
///
/// Dropping the handle stops the game.
pub struct GameLoop {
    controls: mpsc::Sender<Control>,
    live: Arc<AtomicBool>,
    game_over: Option<oneshot::Receiver<GameOver>>,
    state: watch::Receiver<GameState>,
    task: JoinHandle<()>,
}

impl GameLoop {
    /// Spawns the game task. Must be called from within a Tokio runtime.
    pub fn spawn(sim: Simulation, tick: TickConfig) -> Self {
        let (control_tx, control_rx) = mpsc::channel(CONTROL_BUFFER);
        let (over_tx, over_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(sim.state().clone());
        let live = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn(drive(
            sim,
            TickScheduler::new(tick),
            control_rx,
            Arc::clone(&live),
            over_tx,
            state_tx,
        ));

        Self {
            controls: control_tx,
            live,
            game_over: Some(over_rx),
            state: state_rx,
            task,
        }
    }

    /// Queues a flap for the next tick. Returns `false` if the game has
    /// stopped or the buffer is full.
    pub fn flap(&self) -> bool {
        self.send(Control::Flap)
    }

    /// Freezes the run: no tick fires until [`resume`](Self::resume).
    pub fn pause(&self) -> bool {
        self.send(Control::Pause)
    }

    /// Continues a paused run one full tick from now, without catch-up.
    pub fn resume(&self) -> bool {
        self.send(Control::Resume)
    }

    fn send(&self, control: Control) -> bool {
        self.is_live() && self.controls.try_send(control).is_ok()
    }

    /// Stops the game. No tick runs and no game over is published after
    /// this returns.
    pub fn stop(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            debug!("game loop stopped");
        }
    }

    /// `false` once stopped or once the run has ended.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire) && !self.task.is_finished()
    }

    /// The state as of the last tick.
    pub fn state(&self) -> GameState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified after every tick, for rendering.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.state.clone()
    }

    /// Waits for the run to end.
    ///
    /// Resolves to `Some` once. Later calls, and calls after
    /// [`stop`](Self::stop), resolve to `None`.
    pub async fn game_over(&mut self) -> Option<GameOver> {
        let rx = self.game_over.take()?;
        rx.await.ok()
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn drive(
    mut sim: Simulation,
    mut scheduler: TickScheduler,
    mut controls: mpsc::Receiver<Control>,
    live: Arc<AtomicBool>,
    over_tx: oneshot::Sender<GameOver>,
    state_tx: watch::Sender<GameState>,
) {
    let outcome = loop {
        tokio::select! {
            biased;

            control = controls.recv() => match control {
                Some(Control::Flap) if !scheduler.is_paused() => sim.flap(),
                Some(Control::Flap) => trace!("flap while paused ignored"),
                Some(Control::Pause) => scheduler.pause(),
                Some(Control::Resume) => scheduler.resume(),
                // Handle dropped.
                None => break None,
            },

            info = scheduler.wait_for_tick() => {
                if !live.load(Ordering::Acquire) {
                    break None;
                }
                let over = sim.advance(info.dt);
                scheduler.record_tick_end();
                state_tx.send_replace(sim.state().clone());
                trace!(tick = info.tick, score = sim.score(), "game tick");

                if over.is_some() {
                    break over;
                }
            }
        }
    };

    if let Some(over) = outcome {
        // A stop that raced the terminal tick wins.
        if live.swap(false, Ordering::AcqRel) {
            let _ = over_tx.send(over);
        }
    }
    let stats = scheduler.stats();
    debug!(
        ticks = sim.ticks(),
        overruns = stats.total_overruns,
        skipped = stats.total_skipped,
        max_tick_us = stats.max_tick_time.as_micros() as u64,
        "game task finished"
    );
}
