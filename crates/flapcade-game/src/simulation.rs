//! A game state paired with its random source.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::{GameOver, GameState, PhysicsConfig};

/// A single run: state, physics and a seeded RNG for obstacle gaps.
///
/// Two simulations built from the same seed and fed the same flaps at the
/// same ticks produce identical states.
#[derive(Debug, Clone)]
pub struct Simulation {
    physics: PhysicsConfig,
    state: GameState,
    rng: StdRng,
    seed: u64,
    ticks: u64,
}

impl Simulation {
    /// A fresh run scored from zero.
    pub fn new(physics: PhysicsConfig, seed: u64) -> Self {
        Self::resume(physics, seed, 0)
    }

    /// A fresh run whose score counter starts at `initial_score`.
    pub fn resume(physics: PhysicsConfig, seed: u64, initial_score: u64) -> Self {
        let physics = physics.validated();
        let state = GameState::new(&physics, initial_score);
        debug!(seed, initial_score, "simulation created");
        Self {
            physics,
            state,
            rng: StdRng::seed_from_u64(seed),
            seed,
            ticks: 0,
        }
    }

    /// Flaps. Takes effect on the next [`advance`](Self::advance).
    pub fn flap(&mut self) {
        let was_started = self.state.is_started();
        self.state = std::mem::take(&mut self.state).flap(&self.physics);
        if !was_started && self.state.is_started() {
            debug!(seed = self.seed, "run started");
        }
    }

    /// Advances one tick. Returns `Some` on exactly one call: the one on
    /// which the run ends.
    pub fn advance(&mut self, dt: Duration) -> Option<GameOver> {
        if !self.state.is_started() || self.state.is_terminal() {
            return None;
        }
        let (next, over) = std::mem::take(&mut self.state).tick(dt, &self.physics, &mut self.rng);
        self.state = next;
        self.ticks += 1;

        if let Some(over) = &over {
            info!(
                score = over.score,
                cause = ?over.cause,
                ticks = self.ticks,
                "game over"
            );
        }
        over
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks advanced while running.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
