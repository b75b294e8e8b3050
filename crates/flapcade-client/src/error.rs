//! Client error taxonomy.

use flapcade_protocol::{ErrorCode, PaymentRequirements};

use crate::ClientPhase;

/// Why the wallet produced no payment proof.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// The player (or the wallet's own policy) refused to pay.
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("no wallet connected")]
    NotConnected,
}

/// Everything that can go wrong for a client call.
///
/// Callers branch on the variant (and on `code` for `Server`), never on
/// the message text. None of these are fatal; the session returns to a
/// state from which the player can retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The server could not be reached, or stopped answering.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The wallet declined to authorize the payment.
    #[error(transparent)]
    PaymentRejected(#[from] WalletError),

    /// A proof was attached and the gate still wants payment.
    #[error("payment required for {}", requirements.route)]
    PaymentRequired {
        requirements: PaymentRequirements,
        reason: Option<String>,
    },

    /// The server answered with an error.
    #[error("server error ({code}): {message}")]
    Server { code: ErrorCode, message: String },

    /// The server answered with something that makes no sense for the
    /// request.
    #[error("unexpected response: {0}")]
    Unknown(String),

    /// The session state machine can't perform `action` from `phase`.
    #[error("cannot {action} while {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: ClientPhase,
    },
}

impl ClientError {
    /// The wire error code, for server rejections.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether retrying the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unreachable(_) | Self::PaymentRejected(_) | Self::PaymentRequired { .. }
        ) || self.code() == Some(ErrorCode::Internal)
    }

    /// A message to show the player.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable(_) => {
                "Cannot connect to the arcade. Check your connection and try again.".into()
            }
            Self::PaymentRejected(WalletError::NotConnected) => {
                "Please connect your wallet to play.".into()
            }
            Self::PaymentRejected(WalletError::Declined(_)) => {
                "Payment authorization was rejected. Please approve the payment in your wallet."
                    .into()
            }
            Self::PaymentRequired { requirements, .. } => format!(
                "Payment required. Please make sure you have {} on {}.",
                requirements.price, requirements.network
            ),
            Self::Server {
                code: ErrorCode::AlreadyConsumed,
                ..
            } => "This game was already recorded.".into(),
            Self::Server {
                code: ErrorCode::InvalidSession | ErrorCode::NotFound,
                ..
            } => "That game session is not valid. Insert a coin to start a new one.".into(),
            Self::Server {
                code: ErrorCode::InvalidScore,
                ..
            } => "The score could not be recorded.".into(),
            Self::Server { .. } => "Server error. Please try again later.".into(),
            Self::Unknown(_) => "Something went wrong. Please try again.".into(),
            Self::InvalidTransition { .. } => "That action isn't available right now.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use flapcade_protocol::{GatedRoute, Price};

    use super::*;

    fn requirements() -> PaymentRequirements {
        PaymentRequirements {
            route: GatedRoute::Continue,
            price: Price::from_cents(100),
            network: "base-sepolia".into(),
            pay_to: "0xabc".into(),
        }
    }

    #[test]
    fn test_wallet_error_converts_to_payment_rejected() {
        let err: ClientError = WalletError::NotConnected.into();
        assert_eq!(err, ClientError::PaymentRejected(WalletError::NotConnected));
        assert_eq!(err.user_message(), "Please connect your wallet to play.");
    }

    #[test]
    fn test_payment_required_message_names_price() {
        let err = ClientError::PaymentRequired {
            requirements: requirements(),
            reason: None,
        };
        assert_eq!(err.to_string(), "payment required for continue");
        assert!(err.user_message().contains("$1.00 on base-sepolia"));
    }

    #[test]
    fn test_code_only_for_server_errors() {
        let err = ClientError::Server {
            code: ErrorCode::AlreadyConsumed,
            message: "x".into(),
        };
        assert_eq!(err.code(), Some(ErrorCode::AlreadyConsumed));
        assert!(!err.is_retryable());
        assert_eq!(ClientError::Unreachable("down".into()).code(), None);
        assert!(ClientError::Unreachable("down".into()).is_retryable());
    }
}
