use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{DeliveryProof, NewOrder, Order, OrderId, OrderRating, OrderStatusType},
    escrow::PaymentSplit,
    traits::{data_objects::{SplitBackfill, TransitionOutcome}, OrderManagement},
};

/// This trait defines the write-side behaviour for backends supporting the Chef Market engine.
///
/// Every method is a single atomic transaction. The behaviour includes:
/// * Placing orders with their schedule conflict check, split amounts, initial status transition and upfront
///   ledger entries.
/// * Driving the order status state machine with its per-destination side effects.
/// * Recording delivery proofs and ratings.
#[allow(async_fn_in_trait)]
pub trait OrderFlowDatabase: Clone + OrderManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Takes a validated new order and, in a single atomic transaction:
    /// * checks the chef's schedule for a delivery-window overlap with any other non-cancelled order, rejecting
    ///   with [`OrderFlowError::ScheduleConflict`] on a clash. The check and the insert execute as one guarded
    ///   statement, so two racing placements cannot both land.
    /// * stores the order with its split amounts and its `paid` flag (true when the gateway hold succeeded),
    /// * writes the implicit initial `pending` status transition,
    /// * appends the `grocery_advance` and `platform_fee` ledger entries carrying the gateway hold reference.
    async fn create_order(
        &self,
        order: NewOrder,
        split: &PaymentSplit,
        hold_ref: &str,
        paid: bool,
    ) -> Result<Order, OrderFlowError>;

    /// Applies a status transition in a single atomic transaction.
    ///
    /// The transition rule: any `new_status != current` is legal as long as the current status is not terminal.
    /// Terminal orders reject everything with [`OrderFlowError::TerminalState`]. `new_status == current` is the
    /// idempotent degenerate case: nothing is written and the latest matching transition row is returned.
    ///
    /// Side effects keyed by destination:
    /// * `accepted`: when `backfill` is supplied and the ledger is (still) empty, the split amounts are stored
    ///   on the order and the two upfront ledger entries are appended.
    /// * `delivered`: a `final_payout` ledger entry is appended and the returned outcome carries a
    ///   [`crate::traits::PayoutInstruction`] for the caller to settle with the gateway after commit.
    async fn transition_order(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
        changed_by: Option<i64>,
        notes: &str,
        backfill: Option<SplitBackfill>,
    ) -> Result<TransitionOutcome, OrderFlowError>;

    /// Returns true if any other non-cancelled order for the chef has a delivery window overlapping the given
    /// half-open interval. `excluding_order_id` leaves one order out of the check, for window updates.
    async fn has_schedule_conflict(
        &self,
        chef_id: i64,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        excluding_order_id: Option<&OrderId>,
    ) -> Result<bool, OrderFlowError>;

    /// Records (or replaces) the delivery proof for an order.
    async fn upsert_delivery_proof(
        &self,
        order_id: &OrderId,
        signature: &str,
        photo_url: Option<String>,
        submitted_by: i64,
    ) -> Result<DeliveryProof, OrderFlowError>;

    /// Records (or replaces) the client rating for an order. The order must be `delivered` or `completed`.
    async fn upsert_rating(&self, order_id: &OrderId, rating: i64, report: Option<String>)
        -> Result<OrderRating, OrderFlowError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderFlowError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("{field}: {message}")]
    ValidationError { field: &'static str, message: String },
    #[error("The chef already has an order scheduled in this delivery window.")]
    ScheduleConflict,
    #[error("Order {order_id} is {status} and accepts no further transitions.")]
    TerminalState { order_id: OrderId, status: OrderStatusType },
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderIdNotFound(i64),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("Order {order_id} is {status}; a rating requires a delivered or completed order.")]
    NotRateable { order_id: OrderId, status: OrderStatusType },
}

impl OrderFlowError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationError { field, message: message.into() }
    }
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}
