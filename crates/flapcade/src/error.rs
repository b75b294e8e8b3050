//! Unified error type for the Flapcade server.

use flapcade_protocol::{ErrorCode, ProtocolError, Response};
use flapcade_session::{PaymentError, RegistryError};
use flapcade_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum FlapcadeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A registry rejection (unknown token, replay, bad score).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The payment gate refused or couldn't decide.
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl FlapcadeError {
    /// The answer a client gets for this error.
    pub fn into_response(self) -> Response {
        match self {
            Self::Payment(PaymentError::Required {
                requirements,
                reason,
            }) => Response::PaymentRequired {
                requirements,
                reason,
            },
            Self::Payment(PaymentError::Unavailable(_)) => {
                Response::error(ErrorCode::Internal, "payment service unavailable")
            }
            Self::Registry(e) => Response::error(e.code(), e.to_string()),
            Self::Protocol(e) => Response::error(ErrorCode::BadRequest, e.to_string()),
            Self::Transport(_) | Self::Config(_) => {
                Response::error(ErrorCode::Internal, "internal server error")
            }
        }
    }
}
