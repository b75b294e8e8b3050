//! Fixed-rate tick scheduler for Flapcade.
//!
//! The game simulation advances in discrete steps, one per display frame.
//! This crate paces those steps on the Tokio clock, detects late wakeups,
//! and supports pausing the loop without a burst of catch-up ticks on
//! resume.
//!
//! # Integration
//!
//! The scheduler sits inside the game loop's `tokio::select!`:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(()) = flap_rx.recv() => sim.flap(),
//!         info = scheduler.wait_for_tick() => {
//!             let over = sim.advance(info.dt);
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```

mod config;
mod scheduler;

pub use config::{TickConfig, TickPolicy};
pub use scheduler::{TickInfo, TickScheduler, TickStats};
