//! Core protocol types for Flapcade's wire format.
//!
//! Every type here travels on the wire between an arcade cabinet (the
//! `SessionClient`) and the token server. Requests are what a cabinet asks
//! for; responses are what the server answers, echoing the request's `seq`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Price, ScoreInput};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifier of a single-use play token.
///
/// Opaque to cabinets: they receive it on mint and hand it back when
/// validating or submitting a score. `#[serde(transparent)]` keeps it a
/// plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Which paid operation a payment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatedRoute {
    /// One credit: a fresh run from zero.
    Session,
    /// Pay-to-win: a new run that resumes from a previous score.
    Continue,
}

impl fmt::Display for GatedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => f.write_str("session"),
            Self::Continue => f.write_str("continue"),
        }
    }
}

/// Machine-readable terms attached to a payment-required answer.
///
/// The cabinet's wallet reads these, authorizes a payment off-band and
/// retries the request with a [`PaymentProof`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequirements {
    pub route: GatedRoute,
    pub price: Price,
    pub network: String,
    pub pay_to: String,
}

/// Proof of an authorized payment, attached to a retried request.
///
/// The registry never inspects it beyond storing `reference`; checking it
/// is the payment gate's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof {
    pub payer: String,
    pub pay_to: String,
    pub network: String,
    pub amount: Price,
    /// Opaque identifier issued by the payment network.
    pub reference: String,
}

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// Operations a cabinet can ask the server for.
///
/// Internally tagged: `{"type": "SubmitScore", "token_id": "..", "score": 12}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Free. Prices, network and payee.
    Health,

    /// Paid (game price). Mints a fresh token.
    CreateSession,

    /// Paid (continue price). Mints a token carrying `score`.
    CreateContinueSession {
        #[serde(default)]
        score: ScoreInput,
    },

    /// Free. Does the token exist and has it been spent?
    ValidateSession { token_id: TokenId },

    /// Free. Redeems the token with the run's final score.
    SubmitScore {
        token_id: TokenId,
        #[serde(default)]
        score: ScoreInput,
    },

    /// Free. Mocked top scores.
    Leaderboard,
}

/// Server configuration advertised by `Health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub status: String,
    pub pay_to: String,
    pub network: String,
    pub game_price: Price,
    pub continue_price: Price,
}

/// A freshly minted token handed to the cabinet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    pub token_id: TokenId,
    /// Present only for pay-to-win tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carried_score: Option<u64>,
    pub message: String,
}

/// Result of validating a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub token_id: TokenId,
    pub exists: bool,
    pub consumed: bool,
}

/// Acknowledgement of a recorded score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReceipt {
    pub token_id: TokenId,
    pub score: u64,
    pub message: String,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub score: u64,
    pub player: String,
}

/// Machine-readable failure kinds. Callers branch on these, never on
/// the accompanying message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The frame decoded but wasn't a usable request.
    BadRequest,
    /// Unknown token id on score submission.
    InvalidSession,
    /// The token was already redeemed.
    AlreadyConsumed,
    /// Score was negative, fractional or not a number.
    InvalidScore,
    /// Unknown token id on validation.
    NotFound,
    /// The payment gate could not be reached or misbehaved.
    Internal,
}

impl ErrorCode {
    /// HTTP-style status, for logs and for HTTP-based transports.
    pub fn http_status(self) -> u16 {
        match self {
            Self::BadRequest | Self::InvalidScore => 400,
            Self::InvalidSession => 401,
            Self::NotFound => 404,
            Self::AlreadyConsumed => 409,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BadRequest => "bad_request",
            Self::InvalidSession => "invalid_session",
            Self::AlreadyConsumed => "already_consumed",
            Self::InvalidScore => "invalid_score",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Server answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Health(ServerInfo),

    /// Answer to both `CreateSession` and `CreateContinueSession`.
    SessionCreated(SessionGrant),

    SessionStatus(SessionStatus),

    ScoreAccepted(ScoreReceipt),

    Leaderboard { entries: Vec<LeaderboardEntry> },

    /// The request is gated and no acceptable proof was attached.
    /// `reason` explains why a proof that *was* attached got refused.
    PaymentRequired {
        requirements: PaymentRequirements,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    Error { code: ErrorCode, message: String },
}

impl Response {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    /// HTTP-style status of this answer. A validated-but-spent token maps
    /// to 410 Gone even though it isn't an error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::PaymentRequired { .. } => 402,
            Self::Error { code, .. } => code.http_status(),
            Self::SessionStatus(status) if status.consumed => 410,
            _ => 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The content of a frame.
///
/// Adjacently tagged:
///   `{ "type": "Request", "data": { "type": "Health" } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    Request(Request),
    Response(Response),
}

/// The top-level message wrapper. Every frame on the wire is an Envelope.
///
/// ```text
/// ┌──────────────────────────────────┐
/// │ seq: 42                          │  ← responses echo the request's seq
/// │ timestamp: 15000                 │  ← sender's clock, ms
/// │ payment: { ..proof.. }           │  ← only on retried gated requests
/// │ ┌──────────────────────────────┐ │
/// │ │ payload: Request(SubmitScore)│ │
/// │ └──────────────────────────────┘ │
/// └──────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub seq: u64,

    /// Milliseconds since the sender started.
    pub timestamp: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentProof>,

    pub payload: Payload,
}

impl Envelope {
    pub fn request(seq: u64, timestamp: u64, request: Request) -> Self {
        Self {
            seq,
            timestamp,
            payment: None,
            payload: Payload::Request(request),
        }
    }

    pub fn response(seq: u64, timestamp: u64, response: Response) -> Self {
        Self {
            seq,
            timestamp,
            payment: None,
            payload: Payload::Response(response),
        }
    }

    pub fn with_payment(mut self, proof: PaymentProof) -> Self {
        self.payment = Some(proof);
        self
    }
}

// =========================================================================
// Tests
// =========================================================================
