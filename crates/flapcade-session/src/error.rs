//! Error types for the session layer.

use flapcade_protocol::{ErrorCode, PaymentRequirements, ScoreError, TokenId};

/// Errors returned by [`SessionRegistry`](crate::SessionRegistry).
///
/// None of these are fatal: the registry either answers or rejects with
/// one of these, and the caller turns it into a protocol error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Validation of an id the registry never minted.
    #[error("session {0} not found")]
    NotFound(TokenId),

    /// Score submission against an id the registry never minted.
    #[error("invalid session {0}")]
    InvalidSession(TokenId),

    /// The token was already redeemed. The earlier score stands.
    #[error("session {0} already consumed")]
    AlreadyConsumed(TokenId),

    /// The submitted score failed validation; no token was touched.
    #[error("invalid score: {0}")]
    InvalidScore(#[from] ScoreError),
}

impl RegistryError {
    /// The wire code for this rejection.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidSession(_) => ErrorCode::InvalidSession,
            Self::AlreadyConsumed(_) => ErrorCode::AlreadyConsumed,
            Self::InvalidScore(_) => ErrorCode::InvalidScore,
        }
    }
}

/// Why the payment gate refused to admit a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    /// No proof, or a proof that doesn't satisfy `requirements`.
    /// The caller should pay and retry.
    #[error("payment required ({})", reason.as_deref().unwrap_or("no proof attached"))]
    Required {
        requirements: PaymentRequirements,
        reason: Option<String>,
    },

    /// The gate itself couldn't decide (facilitator down, etc.).
    #[error("payment gate unavailable: {0}")]
    Unavailable(String),
}
