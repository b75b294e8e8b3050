//! The arcade's operations over the registry and the payment gate.
//!
//! Transport-agnostic: the connection handler decodes a [`Request`], hands
//! it to [`ArcadeService::handle`] and sends back the [`Response`].

use flapcade_protocol::{
    GatedRoute, LeaderboardEntry, PaymentProof, PaymentRequirements, Request, Response,
    ScoreInput, ScoreReceipt, ServerInfo, SessionGrant, SessionStatus, TokenId,
};
use flapcade_session::{PaymentGate, RegistryError, SessionRegistry};
use tracing::{debug, info};

use crate::{FlapcadeError, ServerConfig};

const SESSION_MESSAGE: &str = "Payment accepted! Press SPACE to start your game.";
const CONTINUE_MESSAGE: &str = "Pay to win activated! Your score has been restored.";
const SCORE_MESSAGE: &str = "Game over! Insert coin to play again.";

/// Shared server state: config, token registry and payment gate.
///
/// One instance lives behind an `Arc` for the server's lifetime; every
/// connection task calls into it concurrently.
pub struct ArcadeService<G> {
    config: ServerConfig,
    registry: SessionRegistry,
    gate: G,
}

impl<G: PaymentGate> ArcadeService<G> {
    pub fn new(config: ServerConfig, gate: G) -> Self {
        Self {
            config,
            registry: SessionRegistry::new(),
            gate,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Answers one request. Every failure becomes a `Response` too.
    pub async fn handle(&self, request: Request, proof: Option<&PaymentProof>) -> Response {
        let result = match request {
            Request::Health => Ok(Response::Health(self.health())),
            Request::CreateSession => self
                .create_session(proof)
                .await
                .map(Response::SessionCreated),
            Request::CreateContinueSession { score } => self
                .create_continue_session(score, proof)
                .await
                .map(Response::SessionCreated),
            Request::ValidateSession { token_id } => self
                .validate_session(&token_id)
                .map(Response::SessionStatus),
            Request::SubmitScore { token_id, score } => self
                .submit_score(&token_id, score)
                .map(Response::ScoreAccepted),
            Request::Leaderboard => Ok(Response::Leaderboard {
                entries: self.leaderboard(),
            }),
        };

        result.unwrap_or_else(|e| {
            debug!(error = %e, "request rejected");
            e.into_response()
        })
    }

    pub fn health(&self) -> ServerInfo {
        ServerInfo {
            status: "ok".into(),
            pay_to: self.config.pay_to.clone(),
            network: self.config.network.clone(),
            game_price: self.config.game_price,
            continue_price: self.config.continue_price,
        }
    }

    /// What a gated route costs and where the money goes.
    pub fn requirements(&self, route: GatedRoute) -> PaymentRequirements {
        let price = match route {
            GatedRoute::Session => self.config.game_price,
            GatedRoute::Continue => self.config.continue_price,
        };
        PaymentRequirements {
            route,
            price,
            network: self.config.network.clone(),
            pay_to: self.config.pay_to.clone(),
        }
    }

    /// Mints a play token once the gate admits the payment.
    pub async fn create_session(
        &self,
        proof: Option<&PaymentProof>,
    ) -> Result<SessionGrant, FlapcadeError> {
        let receipt = self
            .gate
            .admit(&self.requirements(GatedRoute::Session), proof)
            .await?;
        let token = self.registry.mint(receipt.reference, None);
        info!(token_id = %token.id, payer = %receipt.payer, "game session sold");

        Ok(SessionGrant {
            token_id: token.id,
            carried_score: None,
            message: SESSION_MESSAGE.into(),
        })
    }

    /// Mints a pay-to-win token carrying `score`.
    ///
    /// The score is checked before the gate is consulted, so an invalid
    /// request never costs the player anything.
    pub async fn create_continue_session(
        &self,
        score: ScoreInput,
        proof: Option<&PaymentProof>,
    ) -> Result<SessionGrant, FlapcadeError> {
        let score = score.points().map_err(RegistryError::from)?;
        let receipt = self
            .gate
            .admit(&self.requirements(GatedRoute::Continue), proof)
            .await?;
        let token = self.registry.mint(receipt.reference, Some(score));
        info!(
            token_id = %token.id,
            payer = %receipt.payer,
            carried_score = score,
            "pay-to-win session sold"
        );

        Ok(SessionGrant {
            token_id: token.id,
            carried_score: Some(score),
            message: CONTINUE_MESSAGE.into(),
        })
    }

    pub fn validate_session(&self, token_id: &TokenId) -> Result<SessionStatus, FlapcadeError> {
        let status = self.registry.validate(token_id)?;
        Ok(SessionStatus {
            token_id: token_id.clone(),
            exists: status.exists,
            consumed: status.consumed,
        })
    }

    pub fn submit_score(
        &self,
        token_id: &TokenId,
        score: ScoreInput,
    ) -> Result<ScoreReceipt, FlapcadeError> {
        let ack = self.registry.submit_score(token_id, score)?;
        Ok(ScoreReceipt {
            token_id: ack.token_id,
            score: ack.score,
            message: SCORE_MESSAGE.into(),
        })
    }

    /// Ranking isn't computed; this is a fixed board.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        [(42, "0x1234...5678"), (38, "0xabcd...efgh"), (35, "0x9876...5432")]
            .into_iter()
            .zip(1..)
            .map(|((score, player), rank)| LeaderboardEntry {
                rank,
                score,
                player: player.into(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use flapcade_protocol::{ErrorCode, Price};
    use flapcade_session::DevPaymentGate;

    use super::*;

    fn service() -> ArcadeService<DevPaymentGate> {
        ArcadeService::new(ServerConfig::default().pay_to("0xarcade"), DevPaymentGate::new())
    }

    fn proof(amount: Price) -> PaymentProof {
        PaymentProof {
            payer: "0xplayer".into(),
            pay_to: "0xarcade".into(),
            network: "base-sepolia".into(),
            amount,
            reference: "pay-1".into(),
        }
    }

    #[tokio::test]
    async fn test_create_session_without_proof_requires_payment() {
        let svc = service();
        let response = svc.handle(Request::CreateSession, None).await;
        assert_eq!(
            response,
            Response::PaymentRequired {
                requirements: svc.requirements(GatedRoute::Session),
                reason: None
            }
        );
        assert!(svc.registry().is_empty());
    }

    #[tokio::test]
    async fn test_create_session_with_proof_mints() {
        let svc = service();
        let grant = svc
            .create_session(Some(&proof(Price::from_micros(1_000))))
            .await
            .unwrap();
        assert_eq!(grant.message, SESSION_MESSAGE);
        assert_eq!(grant.carried_score, None);

        let token = svc.registry().get(&grant.token_id).unwrap();
        assert_eq!(token.payment_reference, "pay-1");
    }

    #[tokio::test]
    async fn test_continue_requires_the_larger_fee() {
        let svc = service();
        let response = svc
            .handle(
                Request::CreateContinueSession {
                    score: ScoreInput::from(12_u64),
                },
                Some(&proof(Price::from_micros(1_000))),
            )
            .await;
        assert!(matches!(response, Response::PaymentRequired { reason: Some(_), .. }));
        assert!(svc.registry().is_empty());

        let grant = svc
            .create_continue_session(ScoreInput::from(12_u64), Some(&proof(Price::from_cents(100))))
            .await
            .unwrap();
        assert_eq!(grant.carried_score, Some(12));
        assert_eq!(grant.message, CONTINUE_MESSAGE);
    }

    #[tokio::test]
    async fn test_replayed_proof_mints_nothing() {
        let svc = service();
        let paid = proof(Price::from_cents(100));
        svc.create_session(Some(&paid)).await.unwrap();

        for _ in 0..4 {
            let response = svc.handle(Request::CreateSession, Some(&paid)).await;
            assert_eq!(response.http_status(), 402);
        }
        let response = svc
            .handle(
                Request::CreateContinueSession {
                    score: ScoreInput::from(5_u64),
                },
                Some(&paid),
            )
            .await;
        assert!(matches!(
            response,
            Response::PaymentRequired { reason: Some(ref r), .. } if r.contains("already used")
        ));
        assert_eq!(svc.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_continue_invalid_score_rejected_before_payment() {
        let svc = service();
        let response = svc
            .handle(
                Request::CreateContinueSession {
                    score: ScoreInput::from(-3_i64),
                },
                None,
            )
            .await;
        assert!(matches!(
            response,
            Response::Error {
                code: ErrorCode::InvalidScore,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_validate_and_submit_round_trip() {
        let svc = service();
        let grant = svc
            .create_session(Some(&proof(Price::from_micros(1_000))))
            .await
            .unwrap();
        let id = grant.token_id;

        let status = svc.validate_session(&id).unwrap();
        assert!(status.exists && !status.consumed);

        let receipt = svc.submit_score(&id, ScoreInput::from(12_u64)).unwrap();
        assert_eq!(receipt.score, 12);
        assert_eq!(receipt.message, SCORE_MESSAGE);

        let response = svc
            .handle(Request::ValidateSession { token_id: id.clone() }, None)
            .await;
        assert_eq!(response.http_status(), 410);

        let response = svc
            .handle(
                Request::SubmitScore {
                    token_id: id,
                    score: ScoreInput::from(12_u64),
                },
                None,
            )
            .await;
        assert!(matches!(
            response,
            Response::Error {
                code: ErrorCode::AlreadyConsumed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_validate_unknown_is_not_found() {
        let response = service()
            .handle(
                Request::ValidateSession {
                    token_id: TokenId::new("missing"),
                },
                None,
            )
            .await;
        assert_eq!(response.http_status(), 404);
    }

    #[test]
    fn test_health_and_leaderboard() {
        let svc = service();
        let info = svc.health();
        assert_eq!(info.status, "ok");
        assert_eq!(info.pay_to, "0xarcade");
        assert_eq!(info.game_price.to_string(), "$0.001");
        assert_eq!(info.continue_price.to_string(), "$1.00");

        let board = svc.leaderboard();
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].score, 42);
        assert_eq!(board[2].rank, 3);
        assert!(board.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
