use cmb_common::Money;
use thiserror::Error;

use crate::db_types::OrderId;

/// The capability the engine needs from the external payment processor: place money on hold when an order is
/// created, and release the final payout when it is delivered.
///
/// The engine treats this interface as unreliable by contract. A failed hold at order placement is logged and
/// placement continues; a failed release is logged at warn level and the transition still commits, leaving the
/// payout recorded in the ledger but pending at the processor.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone + Send + Sync {
    /// Places `amount` on hold for the given order, returning the processor's reference token.
    async fn create_hold(&self, order_id: &OrderId, amount: Money) -> Result<String, GatewayError>;

    /// Releases `amount` against a previously created hold.
    async fn release(&self, reference: &str, amount: Money) -> Result<(), GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway is unavailable. {0}")]
    Unavailable(String),
    #[error("The payment gateway rejected the request. {0}")]
    Rejected(String),
}
