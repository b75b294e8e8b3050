//! The player's session state machine.

use flapcade_game::{GameLoop, PhysicsConfig, Simulation};
use flapcade_protocol::{ScoreReceipt, TokenId};
use flapcade_tick::TickConfig;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::{ArcadeClient, ClientError, Exchange, Wallet};

/// Where the session is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientPhase {
    #[default]
    Idle,
    /// Waiting on payment and minting.
    Requesting,
    /// Holding a token; a game may run.
    Active,
    /// The game ended and its score was submitted.
    Ended,
}

/// Status of the most recent payment attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentPhase {
    #[default]
    Idle,
    Processing,
    Succeeded,
    Failed,
}

/// The token the current run is authorized by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveToken {
    pub token_id: TokenId,
    /// Set for pay-to-win tokens.
    pub carried_score: Option<u64>,
}

/// Outcome of the score submission made when a run ends.
///
/// A failed submission never blocks the session from moving on; it is
/// reported here for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReport {
    Recorded(ScoreReceipt),
    Failed(ClientError),
}

impl SubmitReport {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

/// Drives one player's sessions against an arcade.
///
/// At most one token is held at a time: neither [`play`](Self::play) nor
/// [`escalate`](Self::escalate) can start while a token is active.
pub struct SessionClient<E, W> {
    arcade: ArcadeClient<E, W>,
    phase: ClientPhase,
    payment: PaymentPhase,
    active_token: Option<ActiveToken>,
    last_score: u64,
    resume_score: u64,
    play_error: Option<ClientError>,
    escalation_error: Option<ClientError>,
}

impl<E: Exchange, W: Wallet> SessionClient<E, W> {
    pub fn new(arcade: ArcadeClient<E, W>) -> Self {
        Self {
            arcade,
            phase: ClientPhase::Idle,
            payment: PaymentPhase::Idle,
            active_token: None,
            last_score: 0,
            resume_score: 0,
            play_error: None,
            escalation_error: None,
        }
    }

    /// Pays for and obtains a fresh token. `Idle → Active`, or back to
    /// `Idle` with [`play_error`](Self::play_error) set.
    pub async fn play(&mut self) -> Result<&ActiveToken, ClientError> {
        self.expect_phase(ClientPhase::Idle, "play")?;
        self.phase = ClientPhase::Requesting;
        self.payment = PaymentPhase::Processing;
        self.play_error = None;

        match self.arcade.create_session().await {
            Ok(grant) => {
                info!(token_id = %grant.token_id, "session started");
                self.payment = PaymentPhase::Succeeded;
                self.resume_score = 0;
                self.phase = ClientPhase::Active;
                Ok(&*self.active_token.insert(ActiveToken {
                    token_id: grant.token_id,
                    carried_score: None,
                }))
            }
            Err(e) => {
                warn!(error = %e, "could not start session");
                self.payment = PaymentPhase::Failed;
                self.phase = ClientPhase::Idle;
                self.play_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Records the final score and submits it against the active token.
    /// `Active → Ended` regardless of whether the submission succeeds.
    ///
    /// The token leaves the session before the submission is sent, so a
    /// run can only ever be submitted once.
    pub async fn finish(&mut self, score: u64) -> Result<SubmitReport, ClientError> {
        self.expect_phase(ClientPhase::Active, "finish")?;
        let token = self
            .active_token
            .take()
            .ok_or(ClientError::InvalidTransition {
                action: "finish",
                phase: self.phase,
            })?;

        self.last_score = score;
        self.phase = ClientPhase::Ended;

        let report = match self.arcade.submit_score(&token.token_id, score).await {
            Ok(receipt) => {
                info!(token_id = %token.token_id, score, "score recorded");
                SubmitReport::Recorded(receipt)
            }
            Err(e) => {
                warn!(token_id = %token.token_id, score, error = %e, "score submission failed");
                SubmitReport::Failed(e)
            }
        };
        Ok(report)
    }

    /// `Ended → Idle`, forgetting the token and resume score.
    pub fn play_again(&mut self) -> Result<(), ClientError> {
        self.expect_phase(ClientPhase::Ended, "play again")?;
        self.phase = ClientPhase::Idle;
        self.payment = PaymentPhase::Idle;
        self.active_token = None;
        self.resume_score = 0;
        self.play_error = None;
        self.escalation_error = None;
        Ok(())
    }

    /// Pays the continue price for a token that resumes from the last
    /// score. `Ended → Active`, or stays `Ended` with
    /// [`escalation_error`](Self::escalation_error) set.
    ///
    /// Not available after a zero-point run.
    pub async fn escalate(&mut self) -> Result<&ActiveToken, ClientError> {
        self.expect_phase(ClientPhase::Ended, "escalate")?;
        if self.last_score == 0 {
            return Err(ClientError::InvalidTransition {
                action: "escalate a zero score",
                phase: self.phase,
            });
        }
        self.phase = ClientPhase::Requesting;
        self.payment = PaymentPhase::Processing;
        self.escalation_error = None;

        match self.arcade.continue_session(self.last_score).await {
            Ok(grant) => {
                let carried = grant.carried_score.unwrap_or(self.last_score);
                info!(token_id = %grant.token_id, carried, "pay-to-win session started");
                self.payment = PaymentPhase::Succeeded;
                self.resume_score = carried;
                self.phase = ClientPhase::Active;
                Ok(&*self.active_token.insert(ActiveToken {
                    token_id: grant.token_id,
                    carried_score: Some(carried),
                }))
            }
            Err(e) => {
                warn!(error = %e, "could not continue session");
                self.payment = PaymentPhase::Failed;
                self.phase = ClientPhase::Ended;
                self.escalation_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Starts a game for the active token, resuming from the carried score
    /// when there is one. Must be called inside a Tokio runtime.
    pub fn launch(&self, physics: PhysicsConfig, tick: TickConfig) -> Result<GameLoop, ClientError> {
        self.expect_phase(ClientPhase::Active, "launch")?;
        let seed = rand::rng().random::<u64>();
        debug!(seed, resume_score = self.resume_score, "launching game");
        let sim = Simulation::resume(physics, seed, self.resume_score);
        Ok(GameLoop::spawn(sim, tick))
    }

    /// Waits for `game` to end and submits its score.
    ///
    /// A game stopped before it ended submits nothing: the session is
    /// [abandoned](Self::abandon) and `None` is returned. `None` is also
    /// returned if the session is no longer active.
    pub async fn complete(&mut self, mut game: GameLoop) -> Option<SubmitReport> {
        let Some(over) = game.game_over().await else {
            let _ = self.abandon();
            return None;
        };
        self.finish(over.score).await.ok()
    }

    /// Gives up the active run without submitting a score.
    /// `Active → Ended`.
    ///
    /// The token is dropped unredeemed and the run counts as a zero score,
    /// so it can't be escalated; [`play_again`](Self::play_again) is the
    /// way out.
    pub fn abandon(&mut self) -> Result<(), ClientError> {
        self.expect_phase(ClientPhase::Active, "abandon")?;
        if let Some(token) = self.active_token.take() {
            info!(token_id = %token.token_id, "run abandoned");
        }
        self.last_score = 0;
        self.resume_score = 0;
        self.phase = ClientPhase::Ended;
        Ok(())
    }

    pub fn phase(&self) -> ClientPhase {
        self.phase
    }

    pub fn payment(&self) -> PaymentPhase {
        self.payment
    }

    pub fn active_token(&self) -> Option<&ActiveToken> {
        self.active_token.as_ref()
    }

    pub fn last_score(&self) -> u64 {
        self.last_score
    }

    /// Non-zero only while a pay-to-win run is active.
    pub fn resume_score(&self) -> u64 {
        self.resume_score
    }

    pub fn play_error(&self) -> Option<&ClientError> {
        self.play_error.as_ref()
    }

    pub fn escalation_error(&self) -> Option<&ClientError> {
        self.escalation_error.as_ref()
    }

    pub fn arcade(&self) -> &ArcadeClient<E, W> {
        &self.arcade
    }

    fn expect_phase(&self, expected: ClientPhase, action: &'static str) -> Result<(), ClientError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ClientError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }
}
