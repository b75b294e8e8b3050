//! Typed arcade operations with the payment retry built in.

use flapcade_protocol::{
    LeaderboardEntry, Request, Response, ScoreInput, ScoreReceipt, ServerInfo, SessionGrant,
    SessionStatus, TokenId,
};
use tracing::{debug, info};

use crate::{ClientError, Exchange, Wallet};

/// Client for the arcade's operations.
///
/// Gated calls are retried exactly once: the first attempt goes out
/// without a proof; if the server answers `PaymentRequired`, the wallet
/// authorizes the stated requirements and the call is repeated with the
/// proof. A second `PaymentRequired` is returned as
/// [`ClientError::PaymentRequired`].
pub struct ArcadeClient<E, W> {
    exchange: E,
    wallet: W,
}

impl<E: Exchange, W: Wallet> ArcadeClient<E, W> {
    pub fn new(exchange: E, wallet: W) -> Self {
        Self { exchange, wallet }
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Sends `request`, paying if the server asks for it.
    ///
    /// Server-side errors come back as `Ok(Response::Error { .. })`; the
    /// typed operations below turn them into [`ClientError::Server`].
    pub async fn call(&self, request: Request) -> Result<Response, ClientError> {
        let (requirements, reason) = match self.exchange.call(request.clone(), None).await? {
            Response::PaymentRequired {
                requirements,
                reason,
            } => (requirements, reason),
            response => return Ok(response),
        };

        debug!(
            route = %requirements.route,
            price = %requirements.price,
            reason = reason.as_deref().unwrap_or(""),
            "payment requested"
        );
        let proof = self.wallet.authorize(&requirements).await?;
        let reference = proof.reference.clone();

        match self.exchange.call(request, Some(proof)).await? {
            Response::PaymentRequired {
                requirements,
                reason,
            } => Err(ClientError::PaymentRequired {
                requirements,
                reason,
            }),
            response => {
                info!(%reference, price = %requirements.price, "payment accepted");
                Ok(response)
            }
        }
    }

    pub async fn health(&self) -> Result<ServerInfo, ClientError> {
        match self.call(Request::Health).await? {
            Response::Health(info) => Ok(info),
            other => Err(unexpected(other)),
        }
    }

    /// Buys a play token.
    pub async fn create_session(&self) -> Result<SessionGrant, ClientError> {
        match self.call(Request::CreateSession).await? {
            Response::SessionCreated(grant) => Ok(grant),
            other => Err(unexpected(other)),
        }
    }

    /// Buys a play token that resumes from `score`.
    pub async fn continue_session(&self, score: u64) -> Result<SessionGrant, ClientError> {
        let request = Request::CreateContinueSession {
            score: ScoreInput::from(score),
        };
        match self.call(request).await? {
            Response::SessionCreated(grant) => Ok(grant),
            other => Err(unexpected(other)),
        }
    }

    pub async fn validate_session(&self, token_id: &TokenId) -> Result<SessionStatus, ClientError> {
        let request = Request::ValidateSession {
            token_id: token_id.clone(),
        };
        match self.call(request).await? {
            Response::SessionStatus(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    /// Redeems `token_id` with a final score.
    pub async fn submit_score(
        &self,
        token_id: &TokenId,
        score: u64,
    ) -> Result<ScoreReceipt, ClientError> {
        let request = Request::SubmitScore {
            token_id: token_id.clone(),
            score: ScoreInput::from(score),
        };
        match self.call(request).await? {
            Response::ScoreAccepted(receipt) => Ok(receipt),
            other => Err(unexpected(other)),
        }
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
        match self.call(Request::Leaderboard).await? {
            Response::Leaderboard { entries } => Ok(entries),
            other => Err(unexpected(other)),
        }
    }
}

/// Classifies a response that isn't the success variant for the call.
fn unexpected(response: Response) -> ClientError {
    match response {
        Response::Error { code, message } => ClientError::Server { code, message },
        Response::PaymentRequired {
            requirements,
            reason,
        } => ClientError::PaymentRequired {
            requirements,
            reason,
        },
        other => ClientError::Unknown(format!("{other:?}")),
    }
}
