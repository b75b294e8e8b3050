//! Error types for the protocol layer.
//!
//! Each crate in Flapcade defines its own error enum. A `ProtocolError`
//! always means the bytes or their shape were wrong, never that a token
//! or payment was refused.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// an unknown `type` tag, or truncated frames.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but makes no sense here, e.g. a cabinet
    /// sending a `Response` to the server.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Why a submitted score was refused.
///
/// Scores arrive from untrusted clients, so anything other than a
/// non-negative whole number is rejected before a token is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    /// The field was missing, null, a string, or some other non-number.
    #[error("score is not a number")]
    NotANumber,

    /// The number was below zero.
    #[error("score must not be negative")]
    Negative,

    /// The number had a fractional part.
    #[error("score must be a whole number")]
    NotInteger,
}

/// A price string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,

    #[error("invalid price {0:?}: expected a decimal amount like 0.001")]
    Malformed(String),

    #[error("price {0:?} has more than six decimal places")]
    TooPrecise(String),
}
