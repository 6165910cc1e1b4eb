use cmb_common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    db_types::{DisputeStatus, DisputeTicket, LedgerEntry, NewDispute, Order, OrderId},
    traits::OrderManagement,
};

/// The result of resolving a dispute. When the resolution carried a non-zero payout adjustment, the refund
/// ledger entry and the updated order are returned alongside the ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeResolution {
    pub ticket: DisputeTicket,
    pub refund_entry: Option<LedgerEntry>,
    pub order: Order,
}

/// Storage behaviour for dispute tickets. Dispute storage always sits on top of order storage, since tickets
/// reference orders and resolutions write into the order's escrow ledger.
///
/// Resolution bypasses the order state machine: a dispute can adjust the payout of an order in any status,
/// including after completion.
#[allow(async_fn_in_trait)]
pub trait DisputeManagement: OrderManagement {
    /// Creates a new dispute ticket in `open` status.
    async fn create_dispute(&self, dispute: NewDispute) -> Result<DisputeTicket, DisputeError>;

    /// Fetches a dispute ticket by id.
    async fn fetch_dispute(&self, ticket_id: i64) -> Result<Option<DisputeTicket>, DisputeError>;

    /// Applies a resolution in a single atomic transaction: the ticket's status, notes and adjustment are
    /// updated, and when `payout_adjustment` is non-zero a `refund` ledger entry is appended to the ticket's
    /// order and the order's recorded final payout is adjusted by the same (possibly negative) amount.
    async fn resolve_dispute(
        &self,
        ticket_id: i64,
        new_status: DisputeStatus,
        resolution_notes: &str,
        payout_adjustment: Money,
    ) -> Result<DisputeResolution, DisputeError>;
}

#[derive(Debug, Clone, Error)]
pub enum DisputeError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested dispute ticket {0} does not exist")]
    DisputeNotFound(i64),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Only the client who placed order {0} may dispute it.")]
    NotOrderClient(OrderId),
}

impl From<sqlx::Error> for DisputeError {
    fn from(e: sqlx::Error) -> Self {
        DisputeError::DatabaseError(e.to_string())
    }
}
