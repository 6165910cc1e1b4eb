use cmb_common::Money;

use crate::{
    db_types::{DeliveryProof, LedgerEntry, LedgerEntryType, Order, OrderId, OrderRating, StatusTransition},
    traits::OrderFlowError,
};

/// Read-only access to orders, their escrow ledger and their status history.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches the order with the given external id, if it exists.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;

    /// Fetches an order's ledger entries, oldest first.
    async fn fetch_ledger_entries(&self, order_id: &OrderId) -> Result<Vec<LedgerEntry>, OrderFlowError>;

    /// The number of ledger entries recorded for the order.
    async fn ledger_entry_count(&self, order_id: &OrderId) -> Result<i64, OrderFlowError>;

    /// The sum of all ledger entries for the order.
    async fn ledger_total(&self, order_id: &OrderId) -> Result<Money, OrderFlowError>;

    /// The sum of the order's ledger entries of the given type.
    async fn ledger_sum_by_type(&self, order_id: &OrderId, entry_type: LedgerEntryType)
        -> Result<Money, OrderFlowError>;

    /// Fetches an order's status transition history, newest first.
    async fn fetch_status_history(&self, order_id: &OrderId) -> Result<Vec<StatusTransition>, OrderFlowError>;

    /// Fetches the delivery proof for an order, if one has been submitted.
    async fn fetch_delivery_proof(&self, order_id: &OrderId) -> Result<Option<DeliveryProof>, OrderFlowError>;

    /// Fetches the rating for an order, if the client has rated it.
    async fn fetch_rating(&self, order_id: &OrderId) -> Result<Option<OrderRating>, OrderFlowError>;
}
