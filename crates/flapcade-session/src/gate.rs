//! Payment gate hook for admitting paid requests.
//!
//! Flapcade doesn't verify payments itself; that belongs to a payment
//! network and its facilitator. Instead the registry's caller asks a
//! [`PaymentGate`] whether a request was paid for. The gate either admits
//! it, returning a [`PaymentReceipt`] whose reference is stored on the
//! minted token, or answers [`PaymentError::Required`] with the terms the
//! cabinet must satisfy before retrying.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use flapcade_protocol::{PaymentProof, PaymentRequirements};

use crate::PaymentError;

/// What the gate hands back when it admits a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Opaque payment identifier, kept on the token for audit.
    pub reference: String,
    pub payer: String,
}

/// Decides whether a gated request was paid for.
///
/// `Send + Sync + 'static` because one gate is shared by every connection
/// task for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use flapcade_protocol::{PaymentProof, PaymentRequirements};
/// use flapcade_session::{PaymentError, PaymentGate, PaymentReceipt};
///
/// /// Free play: admits everything. Handy for a cabinet on the show floor.
/// struct FreePlay;
///
/// impl PaymentGate for FreePlay {
///     async fn admit(
///         &self,
///         _requirements: &PaymentRequirements,
///         _proof: Option<&PaymentProof>,
///     ) -> Result<PaymentReceipt, PaymentError> {
///         Ok(PaymentReceipt {
///             reference: "free-play".into(),
///             payer: "house".into(),
///         })
///     }
/// }
/// ```
pub trait PaymentGate: Send + Sync + 'static {
    /// Checks `proof` against `requirements`.
    ///
    /// # Returns
    /// - `Ok(PaymentReceipt)` — admitted
    /// - `Err(PaymentError::Required)` — missing or insufficient proof
    /// - `Err(PaymentError::Unavailable)` — the gate couldn't decide
    fn admit(
        &self,
        requirements: &PaymentRequirements,
        proof: Option<&PaymentProof>,
    ) -> impl std::future::Future<Output = Result<PaymentReceipt, PaymentError>> + Send;
}

/// A gate that trusts proofs at face value.
///
/// It checks that a proof is present, targets the right network and
/// payee, covers the price and carries a reference not admitted before.
/// It does not verify any signature, so it is only fit for local
/// development and tests.
#[derive(Debug, Default)]
pub struct DevPaymentGate {
    /// References already admitted, on any route.
    spent: Mutex<HashSet<String>>,
}

impl DevPaymentGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `reference` has already bought something.
    pub fn is_spent(&self, reference: &str) -> bool {
        self.spent().contains(reference)
    }

    fn spent(&self) -> MutexGuard<'_, HashSet<String>> {
        self.spent.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PaymentGate for DevPaymentGate {
    async fn admit(
        &self,
        requirements: &PaymentRequirements,
        proof: Option<&PaymentProof>,
    ) -> Result<PaymentReceipt, PaymentError> {
        let refuse = |reason: Option<String>| PaymentError::Required {
            requirements: requirements.clone(),
            reason,
        };

        let Some(proof) = proof else {
            return Err(refuse(None));
        };
        if proof.network != requirements.network {
            return Err(refuse(Some(format!(
                "wrong network: expected {}, got {}",
                requirements.network, proof.network
            ))));
        }
        if proof.pay_to != requirements.pay_to {
            return Err(refuse(Some("payment sent to the wrong address".into())));
        }
        if proof.amount < requirements.price {
            return Err(refuse(Some(format!(
                "insufficient amount: {} < {}",
                proof.amount, requirements.price
            ))));
        }
        if proof.reference.trim().is_empty() {
            return Err(refuse(Some("missing payment reference".into())));
        }
        let fresh = self.spent().insert(proof.reference.clone());
        if !fresh {
            tracing::warn!(
                route = %requirements.route,
                payer = %proof.payer,
                reference = %proof.reference,
                "payment reference replayed"
            );
            return Err(refuse(Some("payment reference already used".into())));
        }

        tracing::debug!(
            route = %requirements.route,
            payer = %proof.payer,
            amount = %proof.amount,
            "payment admitted"
        );
        Ok(PaymentReceipt {
            reference: proof.reference.clone(),
            payer: proof.payer.clone(),
        })
    }
}
