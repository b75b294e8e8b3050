//! # Flapcade
//!
//! A coin-operated arcade over the network: pay a small fee for a
//! single-use play token, play, submit the score against the token.
//! Paying a larger fee mints a token that resumes a lost game at its
//! score.
//!
//! The server ties the layers together: transport → protocol → session.
//! Payment verification is delegated to a [`PaymentGate`]; the server
//! only asks whether a gated request is admitted.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flapcade::prelude::*;
//!
//! # async fn run() -> Result<(), FlapcadeError> {
//! let config = ServerConfig::from_env()?;
//! let server = FlapcadeServerBuilder::new()
//!     .config(config)
//!     .build(DevPaymentGate::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod service;

pub use config::{ConfigError, ServerConfig};
pub use error::FlapcadeError;
pub use server::{FlapcadeServer, FlapcadeServerBuilder};
pub use service::ArcadeService;

pub use flapcade_session::{DevPaymentGate, PaymentGate};

pub mod prelude {
    pub use crate::{
        ArcadeService, ConfigError, FlapcadeError, FlapcadeServer, FlapcadeServerBuilder,
        ServerConfig,
    };
    pub use flapcade_protocol::{
        Envelope, ErrorCode, GatedRoute, LeaderboardEntry, Payload, PaymentProof,
        PaymentRequirements, Price, Request, Response, ScoreInput, ScoreReceipt, ServerInfo,
        SessionGrant, SessionStatus, TokenId,
    };
    pub use flapcade_session::{
        DevPaymentGate, PaymentError, PaymentGate, PaymentReceipt, RegistryError,
        SessionRegistry,
    };
}
