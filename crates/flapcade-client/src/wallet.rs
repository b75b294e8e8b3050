//! The payer side of the payment gate.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use flapcade_protocol::{PaymentProof, PaymentRequirements, Price};

use crate::WalletError;

/// Produces payment proofs for the gate's requirements.
///
/// A real implementation signs a transfer authorization; the client only
/// cares that it either returns a proof or refuses.
pub trait Wallet: Send + Sync {
    /// Address payments come from, if a wallet is connected.
    fn address(&self) -> Option<&str>;

    /// Authorizes a payment meeting `requirements`.
    fn authorize(
        &self,
        requirements: &PaymentRequirements,
    ) -> impl Future<Output = Result<PaymentProof, WalletError>> + Send;
}

/// A local wallet that pays whatever is asked, up to an optional limit.
///
/// Proofs carry a `dev-{payer}-{nonce}-{n}` reference and are accepted by
/// the server's development gate, which admits each reference once. The
/// nonce is random per wallet so two wallets for one address never collide.
#[derive(Debug)]
pub struct DevWallet {
    address: Option<String>,
    limit: Option<Price>,
    nonce: u32,
    issued: AtomicU64,
}

impl DevWallet {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            limit: None,
            nonce: rand::random(),
            issued: AtomicU64::new(0),
        }
    }

    /// A wallet with no account; every authorization fails with
    /// [`WalletError::NotConnected`].
    pub fn disconnected() -> Self {
        Self {
            address: None,
            limit: None,
            nonce: 0,
            issued: AtomicU64::new(0),
        }
    }

    /// Declines any single payment above `limit`.
    pub fn with_limit(mut self, limit: Price) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of proofs issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

impl Wallet for DevWallet {
    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    async fn authorize(
        &self,
        requirements: &PaymentRequirements,
    ) -> Result<PaymentProof, WalletError> {
        let payer = self.address.as_deref().ok_or(WalletError::NotConnected)?;

        if let Some(limit) = self.limit {
            if requirements.price > limit {
                tracing::info!(
                    price = %requirements.price,
                    %limit,
                    "payment above wallet limit declined"
                );
                return Err(WalletError::Declined(format!(
                    "{} exceeds limit of {limit}",
                    requirements.price
                )));
            }
        }

        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            route = %requirements.route,
            price = %requirements.price,
            n,
            "payment authorized"
        );
        Ok(PaymentProof {
            payer: payer.to_string(),
            pay_to: requirements.pay_to.clone(),
            network: requirements.network.clone(),
            amount: requirements.price,
            reference: format!("dev-{payer}-{:08x}-{n}", self.nonce),
        })
    }
}
