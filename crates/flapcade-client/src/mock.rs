//! Scripted [`Exchange`] for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use flapcade_protocol::{
    GatedRoute, PaymentProof, PaymentRequirements, Price, Request, Response, SessionGrant,
    TokenId,
};

use crate::{ClientError, Exchange};

pub(crate) type Call = (Request, Option<PaymentProof>);

/// Answers calls from a queue and records what was sent. An empty queue
/// answers `Unreachable`.
pub(crate) struct MockExchange {
    replies: Mutex<VecDeque<Result<Response, ClientError>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockExchange {
    pub(crate) fn new(replies: impl IntoIterator<Item = Result<Response, ClientError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, reply: Result<Response, ClientError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Exchange for MockExchange {
    async fn call(
        &self,
        request: Request,
        payment: Option<PaymentProof>,
    ) -> Result<Response, ClientError> {
        self.calls.lock().unwrap().push((request, payment));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Unreachable("no scripted reply".into())))
    }
}

pub(crate) fn payment_required(route: GatedRoute, cents: u64) -> Response {
    Response::PaymentRequired {
        requirements: PaymentRequirements {
            route,
            price: Price::from_cents(cents),
            network: "base-sepolia".into(),
            pay_to: "0xarcade".into(),
        },
        reason: None,
    }
}

pub(crate) fn grant(token_id: &str, carried_score: Option<u64>) -> SessionGrant {
    SessionGrant {
        token_id: TokenId::new(token_id),
        carried_score,
        message: "ok".into(),
    }
}
