//! Play-token registry for Flapcade.
//!
//! This crate is the server's ledger of paid admissions:
//!
//! 1. **Payment gate** — deciding whether a request was paid for
//!    ([`PaymentGate`] trait, [`DevPaymentGate`] for local play)
//! 2. **Minting** — turning an admitted payment into a [`PlayToken`]
//!    ([`SessionRegistry::mint`])
//! 3. **Redemption** — consuming a token exactly once with a final score
//!    ([`SessionRegistry::submit_score`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)  ← admits through the gate, mints, validates, redeems
//!     ↕
//! Session Layer (this crate)  ← owns the token map
//!     ↕
//! Protocol Layer (below)  ← provides TokenId, ScoreInput, payment types
//! ```
//!
//! Tokens live in memory for the lifetime of the process. Nothing expires
//! them and nothing persists them across restarts.

mod error;
mod gate;
mod registry;
mod token;

pub use error::{PaymentError, RegistryError};
pub use gate::{DevPaymentGate, PaymentGate, PaymentReceipt};
pub use registry::SessionRegistry;
pub use token::{PlayToken, ScoreAck, TokenStatus};
