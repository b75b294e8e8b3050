//! The session registry: every play token the server has minted.
//!
//! Responsible for:
//! - Minting tokens once the payment gate has admitted a request
//! - Reporting whether a token exists and has been spent
//! - Redeeming a token exactly once with a validated score
//!
//! # Concurrency note
//!
//! Unlike a per-task manager, the registry is shared by every connection
//! task, so it synchronizes internally: the map sits behind an `RwLock`
//! and each record carries its own atomic consumed flag. Duplicate score
//! submissions racing on one token only ever take the read lock and then
//! compete on a single compare-and-swap.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use flapcade_protocol::{ScoreInput, TokenId};
use rand::Rng;

use crate::token::TokenRecord;
use crate::{PlayToken, RegistryError, ScoreAck, TokenStatus};

/// In-memory store of play tokens, owned by whoever serves requests.
///
/// ## Lifecycle of a token
///
/// ```text
/// gate admits ──→ mint() ──→ [unconsumed] ──submit_score()──→ [consumed]
///                                │                                │
///                           validate(): exists              validate(): exists,
///                                                             consumed (gone)
/// ```
///
/// Tokens are never deleted and never expire; the map grows with every paid
/// admission until the process exits.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    tokens: RwLock<HashMap<TokenId, Arc<TokenRecord>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh token. The caller must already have passed the payment
    /// gate; there is no failure path.
    ///
    /// `carried_score` is `Some` only for pay-to-win tokens.
    pub fn mint(
        &self,
        payment_reference: impl Into<String>,
        carried_score: Option<u64>,
    ) -> PlayToken {
        let payment_reference = payment_reference.into();
        let mut tokens = self.write();

        // 128 random bits; the retry only guards the astronomically
        // unlikely collision.
        let record = loop {
            let id = generate_token_id();
            if let Entry::Vacant(slot) = tokens.entry(id.clone()) {
                let record = Arc::new(TokenRecord::new(
                    id,
                    payment_reference,
                    carried_score,
                ));
                slot.insert(Arc::clone(&record));
                break record;
            }
        };
        drop(tokens);

        let token = record.snapshot();
        tracing::info!(
            token_id = %token.id,
            payment_reference = %token.payment_reference,
            carried_score = ?token.carried_score,
            "play token minted"
        );
        token
    }

    /// Reports whether a token exists and whether it has been spent.
    ///
    /// A spent token is not an error here: it reports `consumed = true`.
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] if the id was never minted.
    pub fn validate(&self, token_id: &TokenId) -> Result<TokenStatus, RegistryError> {
        let record = self
            .lookup(token_id)
            .ok_or_else(|| RegistryError::NotFound(token_id.clone()))?;
        Ok(TokenStatus {
            exists: true,
            consumed: record.is_consumed(),
        })
    }

    /// Redeems a token with the run's final score.
    ///
    /// The score is validated before the token is looked at, so a bad score
    /// never spends a token. Among concurrent callers for the same id,
    /// exactly one gets `Ok`; the rest see `AlreadyConsumed`.
    ///
    /// # Errors
    /// - [`RegistryError::InvalidScore`] — negative, fractional or non-numeric
    /// - [`RegistryError::InvalidSession`] — unknown id
    /// - [`RegistryError::AlreadyConsumed`] — replay of a spent token
    pub fn submit_score(
        &self,
        token_id: &TokenId,
        score: ScoreInput,
    ) -> Result<ScoreAck, RegistryError> {
        let score = score.points()?;

        let record = self
            .lookup(token_id)
            .ok_or_else(|| RegistryError::InvalidSession(token_id.clone()))?;

        if !record.try_consume(score) {
            tracing::debug!(%token_id, score, "replayed score submission rejected");
            return Err(RegistryError::AlreadyConsumed(token_id.clone()));
        }

        tracing::info!(%token_id, score, "score submitted, token consumed");
        Ok(ScoreAck {
            token_id: token_id.clone(),
            score,
            carried_score: record.carried_score(),
        })
    }

    /// Looks up a snapshot of a token.
    pub fn get(&self, token_id: &TokenId) -> Option<PlayToken> {
        self.lookup(token_id).map(|record| record.snapshot())
    }

    /// The score recorded by the winning submission, if any.
    pub fn recorded_score(&self, token_id: &TokenId) -> Option<u64> {
        self.lookup(token_id).and_then(|record| record.final_score())
    }

    /// Number of tokens ever minted by this registry.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if nothing has been minted yet.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn lookup(&self, token_id: &TokenId) -> Option<Arc<TokenRecord>> {
        self.read().get(token_id).cloned()
    }

    // Writers only ever insert a fully built record, so a poisoned lock
    // still guards a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<TokenId, Arc<TokenRecord>>> {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TokenId, Arc<TokenRecord>>> {
        self.tokens.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Generates a random 32-character hex token id (128 bits of entropy).
fn generate_token_id() -> TokenId {
    let bytes: [u8; 16] = rand::rng().random();
    TokenId::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}

// =========================================================================
// Tests
// =========================================================================
