//! Token types: the registry's record of one paid admission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::SystemTime;

use flapcade_protocol::TokenId;

/// A snapshot of one play token.
///
/// Everything except `consumed` is fixed at mint time. `consumed` flips
/// from `false` to `true` exactly once, when a score is redeemed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayToken {
    pub id: TokenId,
    /// Informational; no expiry is enforced.
    pub created_at: SystemTime,
    pub consumed: bool,
    /// Reference issued by the payment gate. Stored, never checked.
    pub payment_reference: String,
    /// Score the run resumes from (pay-to-win tokens only).
    pub carried_score: Option<u64>,
}

/// What `validate` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStatus {
    pub exists: bool,
    pub consumed: bool,
}

/// Acknowledgement returned to the single winning `submit_score` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreAck {
    pub token_id: TokenId,
    pub score: u64,
    pub carried_score: Option<u64>,
}

/// Shared per-token state inside the registry map.
///
/// The consumed flag is atomic so redemption is a single compare-and-swap
/// and never needs the map's write lock.
#[derive(Debug)]
pub(crate) struct TokenRecord {
    id: TokenId,
    created_at: SystemTime,
    payment_reference: String,
    carried_score: Option<u64>,
    consumed: AtomicBool,
    /// Written only by the caller that won the consume.
    final_score: OnceLock<u64>,
}

impl TokenRecord {
    pub(crate) fn new(
        id: TokenId,
        payment_reference: String,
        carried_score: Option<u64>,
    ) -> Self {
        Self {
            id,
            created_at: SystemTime::now(),
            payment_reference,
            carried_score,
            consumed: AtomicBool::new(false),
            final_score: OnceLock::new(),
        }
    }

    pub(crate) fn carried_score(&self) -> Option<u64> {
        self.carried_score
    }

    pub(crate) fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::Acquire)
    }

    /// Atomically flips `consumed` to true. Returns `true` for exactly one
    /// caller over the record's lifetime.
    pub(crate) fn try_consume(&self, score: u64) -> bool {
        let won = self
            .consumed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            let _ = self.final_score.set(score);
        }
        won
    }

    pub(crate) fn final_score(&self) -> Option<u64> {
        self.final_score.get().copied()
    }

    pub(crate) fn snapshot(&self) -> PlayToken {
        PlayToken {
            id: self.id.clone(),
            created_at: self.created_at,
            consumed: self.is_consumed(),
            payment_reference: self.payment_reference.clone(),
            carried_score: self.carried_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_consume_wins_once() {
        let record = TokenRecord::new(TokenId::new("t"), "pay".into(), None);
        assert!(!record.is_consumed());
        assert!(record.try_consume(4));
        assert!(!record.try_consume(9));
        assert!(record.is_consumed());
        assert_eq!(record.final_score(), Some(4));
    }

    #[test]
    fn test_snapshot_reflects_consumption() {
        let record = TokenRecord::new(TokenId::new("t"), "pay".into(), Some(12));
        let before = record.snapshot();
        record.try_consume(15);
        let after = record.snapshot();

        assert!(!before.consumed);
        assert!(after.consumed);
        assert_eq!(after.carried_score, Some(12));
        assert_eq!(before.created_at, after.created_at);
    }
}
