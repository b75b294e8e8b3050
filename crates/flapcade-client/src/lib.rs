//! Player-side client for Flapcade.
//!
//! - [`Exchange`] moves one request/response pair; [`RemoteArcade`] does it
//!   over a WebSocket.
//! - [`ArcadeClient`] adds the payment step: when a gated request comes
//!   back `PaymentRequired`, it asks the [`Wallet`] for a proof and retries
//!   once with the proof attached.
//! - [`SessionClient`] is the state machine a game front end drives:
//!   request a token, run the game, submit the score, optionally pay to
//!   continue from the last score.
//!
//! ```text
//! Idle ──play()──→ Requesting ──ok──→ Active ──finish()───→ Ended
//!  ↑                   │ err                  └─abandon()──→  │
//!  └───────────────────┘                                      │
//!  ↑                                                          │
//!  └─────────────────────── play_again() ─────────────────────┤
//!                                                             │
//!             Active ←──ok── Requesting ←──escalate()─────────┘
//!                                 │ err → back to Ended
//! ```

mod api;
mod error;
mod exchange;
mod session;
mod wallet;

#[cfg(test)]
mod mock;

pub use api::ArcadeClient;
pub use error::{ClientError, WalletError};
pub use exchange::{Exchange, RemoteArcade};
pub use session::{ActiveToken, ClientPhase, PaymentPhase, SessionClient, SubmitReport};
pub use wallet::{DevWallet, Wallet};
