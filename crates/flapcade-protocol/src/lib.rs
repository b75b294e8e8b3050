//! Wire protocol for Flapcade.
//!
//! This crate defines the "language" arcade cabinets and the token server
//! speak:
//!
//! - **Types** ([`Envelope`], [`Request`], [`Response`], [`TokenId`], etc.) —
//!   the message structures that travel on the wire.
//! - **Values** ([`Price`], [`ScoreInput`]) — amounts and scores with their
//!   own parsing and validation rules.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`], [`ScoreError`], [`PriceError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the session
//! registry. It doesn't know about connections or tokens' lifecycles —
//! it only knows how messages look.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Registry / SessionClient
//! ```

mod codec;
mod error;
mod price;
mod score;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{PriceError, ProtocolError, ScoreError};
pub use price::Price;
pub use score::ScoreInput;
pub use types::{
    Envelope, ErrorCode, GatedRoute, LeaderboardEntry, PaymentProof,
    PaymentRequirements, Payload, Request, Response, ScoreReceipt,
    ServerInfo, SessionGrant, SessionStatus, TokenId,
};
