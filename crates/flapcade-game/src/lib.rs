//! The Flapcade game simulation.
//!
//! A subject falls under gravity, flaps upward on input, and threads gaps
//! in obstacles that scroll in from the right. Each obstacle passed scores
//! one point; touching an obstacle or leaving the playfield ends the run.
//!
//! The crate is layered:
//!
//! - [`GameState::tick`] is a pure transition: it takes the owned state and
//!   returns the next one, plus a [`GameOver`] on the tick the run ends.
//! - [`Simulation`] pairs the state with a seeded RNG so a run can be
//!   replayed exactly from its seed and input sequence.
//! - [`GameLoop`] drives a simulation on a Tokio task at a fixed tick rate,
//!   feeding flaps in between ticks and publishing the game over once.
//!
//! The "report once" rule is the important one: after the terminal tick,
//! flaps and ticks are no-ops and no second [`GameOver`] is produced.

mod physics;
mod runner;
mod simulation;
mod state;

pub use physics::PhysicsConfig;
pub use runner::GameLoop;
pub use simulation::Simulation;
pub use state::{DeathCause, GameOver, GameState, Obstacle, Phase, Subject};
