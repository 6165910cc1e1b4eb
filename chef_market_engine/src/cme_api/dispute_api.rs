use std::fmt::Debug;

use cmb_common::Money;
use log::*;

use crate::{
    db_types::{DisputeStatus, DisputeTicket, NewDispute, OrderId},
    traits::{DisputeError, DisputeManagement, DisputeResolution, OrderManagement},
};

/// `DisputeApi` handles dispute tickets and the payout adjustments their resolutions carry. Adjustments land in
/// the escrow ledger as `refund` entries and bypass the order state machine entirely: a dispute can be resolved
/// against an order in any status, including after completion.
pub struct DisputeApi<B> {
    db: B,
}

impl<B> Debug for DisputeApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DisputeApi")
    }
}

impl<B> DisputeApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> DisputeApi<B>
where B: DisputeManagement
{
    /// Opens a dispute against an order. Only the client who placed the order may raise one.
    pub async fn open_dispute(
        &self,
        order_id: &OrderId,
        raised_by: i64,
        description: String,
    ) -> Result<DisputeTicket, DisputeError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await
            .map_err(|e| DisputeError::DatabaseError(e.to_string()))?
            .ok_or_else(|| DisputeError::OrderNotFound(order_id.clone()))?;
        if order.client_id != raised_by {
            return Err(DisputeError::NotOrderClient(order_id.clone()));
        }
        let ticket = self
            .db
            .create_dispute(NewDispute { order_id: order_id.clone(), raised_by, description })
            .await?;
        debug!("⚖️ Dispute #{} opened against order {order_id} by client #{raised_by}", ticket.id);
        Ok(ticket)
    }

    /// Fetches a dispute ticket by id.
    pub async fn dispute(&self, ticket_id: i64) -> Result<DisputeTicket, DisputeError> {
        self.db.fetch_dispute(ticket_id).await?.ok_or(DisputeError::DisputeNotFound(ticket_id))
    }

    /// Resolves a dispute. A non-zero `payout_adjustment` appends a `refund` ledger entry to the ticket's order
    /// and moves the order's recorded final payout by the same amount. Caller is responsible for having
    /// admin-gated this operation.
    pub async fn resolve_dispute(
        &self,
        ticket_id: i64,
        new_status: DisputeStatus,
        resolution_notes: &str,
        payout_adjustment: Money,
    ) -> Result<DisputeResolution, DisputeError> {
        let resolution = self.db.resolve_dispute(ticket_id, new_status, resolution_notes, payout_adjustment).await?;
        if let Some(entry) = &resolution.refund_entry {
            info!(
                "⚖️ Dispute #{ticket_id} resolved with a {} adjustment; order {} final payout is now {}",
                entry.amount, resolution.order.order_id, resolution.order.final_payout_amount
            );
        } else {
            debug!("⚖️ Dispute #{ticket_id} updated to {new_status} with no payout adjustment");
        }
        Ok(resolution)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
