use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{DeliveryProof, NewOrder, Order, OrderId, OrderRating, OrderStatusType},
    escrow::{calculate_split, SplitRatios},
    events::{EventProducers, StatusChangedEvent},
    gateway::hold_reference,
    traits::{OrderFlowDatabase, OrderFlowError, PaymentGateway, SplitBackfill, TransitionOutcome},
};
use crate::cme_api::order_objects::{OrderResult, StatusChange};

/// `OrderFlowApi` is the primary API for the order lifecycle: placing orders against a chef's schedule,
/// driving them through the status state machine, and settling the escrow with the payment gateway.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
    ratios: SplitRatios,
    producers: EventProducers,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G, ratios: SplitRatios, producers: EventProducers) -> Self {
        Self { db, gateway, ratios, producers }
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: OrderFlowDatabase,
    G: PaymentGateway,
{
    /// Places a new order.
    ///
    /// The draft is validated first: the delivery window must be well-ordered before the schedule conflict is
    /// even considered, and validation failure aborts before any persistence or ledger write. The escrow split
    /// is computed from the configured ratios, a hold for the order total is requested from the gateway, and
    /// the order, its initial `pending` transition and the two upfront ledger entries are stored in one atomic
    /// unit. A hold failure is logged and placement continues with a fallback reference (demo-mode semantics).
    pub async fn place_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        validate_window(&order)?;
        let split = calculate_split(order.total_price, self.ratios);
        let (hold_ref, paid) = match self.gateway.create_hold(&order.order_id, order.total_price).await {
            Ok(reference) => (reference, true),
            Err(e) => {
                warn!("💰️ Could not create a hold for order {}: {e}. Continuing with a local reference.", order.order_id);
                (hold_reference(&order.order_id), false)
            },
        };
        let order = self.db.create_order(order, &split, &hold_ref, paid).await?;
        debug!("📦️ Order {} placed for chef #{} with split {split:?}", order.order_id, order.chef_id);
        Ok(order)
    }

    /// Changes the status of an order.
    ///
    /// The transition rule is owned by the backend: any destination different from the current status is legal
    /// unless the current status is terminal, and a same-status call is the idempotent no-write case. This
    /// method layers the non-transactional side effects on top:
    /// * `accepted`: when the order's ledger is still empty (the split was not recorded at placement), a hold
    ///   is requested and the split backfill is handed to the backend to apply inside the transaction.
    /// * `delivered`: once the transition has committed, the final payout is released at the gateway. A
    ///   gateway failure is logged and swallowed; the payout stays recorded in the ledger and pending at the
    ///   processor.
    /// * every actual change is broadcast to realtime subscribers, best-effort.
    pub async fn transition_order(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
        changed_by: Option<i64>,
        notes: &str,
    ) -> Result<StatusChange, OrderFlowError> {
        let backfill = self.accepted_backfill(order_id, new_status).await?;
        let outcome = self.db.transition_order(order_id, new_status, changed_by, notes, backfill).await?;
        if let Some(payout) = &outcome.payout_due {
            if let Err(e) = self.gateway.release(&payout.reference, payout.amount).await {
                warn!(
                    "💰️ Payout of {} for order {order_id} is recorded but could not be released: {e}. The \
                     release must be retried out of band.",
                    payout.amount
                );
            }
        }
        if outcome.changed {
            self.call_status_changed_hook(&outcome).await;
        }
        debug!("📦️ Order {order_id} is now {}", outcome.order.status);
        Ok(StatusChange { order: outcome.order, transition: outcome.transition })
    }

    /// Records a delivery proof for the order and drives the `delivered` transition off the back of it.
    pub async fn record_delivery_proof(
        &self,
        order_id: &OrderId,
        signature: &str,
        photo_url: Option<String>,
        submitted_by: i64,
    ) -> Result<(DeliveryProof, StatusChange), OrderFlowError> {
        let proof = self.db.upsert_delivery_proof(order_id, signature, photo_url, submitted_by).await?;
        debug!("📦️ Delivery proof for order {order_id} submitted by dispatch #{submitted_by}");
        let change = self
            .transition_order(order_id, OrderStatusType::Delivered, None, "Delivery proof submitted")
            .await?;
        Ok((proof, change))
    }

    /// Records the client's rating for a delivered or completed order.
    pub async fn rate_order(
        &self,
        order_id: &OrderId,
        rating: i64,
        report: Option<String>,
    ) -> Result<OrderRating, OrderFlowError> {
        if !(1..=5).contains(&rating) {
            return Err(OrderFlowError::validation("rating", "Rating must be between 1 and 5."));
        }
        self.db.upsert_rating(order_id, rating, report).await
    }

    /// Fetches the composite view of an order: the aggregate, its ledger and its status history.
    pub async fn order_result(&self, order_id: &OrderId) -> Result<OrderResult, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        let ledger = self.db.fetch_ledger_entries(order_id).await?;
        let history = self.db.fetch_status_history(order_id).await?;
        Ok(OrderResult { order, ledger, history })
    }

    /// Prepares the `accepted` split backfill when the order's ledger is still empty. The backend re-checks
    /// emptiness inside the transaction before applying it.
    async fn accepted_backfill(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
    ) -> Result<Option<SplitBackfill>, OrderFlowError> {
        if new_status != OrderStatusType::Accepted {
            return Ok(None);
        }
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if self.db.ledger_entry_count(order_id).await? > 0 {
            return Ok(None);
        }
        let split = calculate_split(order.total_price, self.ratios);
        let (reference, paid) = match self.gateway.create_hold(order_id, order.total_price).await {
            Ok(reference) => (reference, true),
            Err(e) => {
                warn!("💰️ Could not create a hold for order {order_id}: {e}. Continuing with a local reference.");
                (hold_reference(order_id), false)
            },
        };
        Ok(Some(SplitBackfill { split, reference, paid }))
    }

    async fn call_status_changed_hook(&self, outcome: &TransitionOutcome) {
        let event = StatusChangedEvent::new(outcome.order.order_id.clone(), outcome.order.status);
        for emitter in &self.producers.status_changed_producer {
            trace!("📬️ Notifying status change subscribers for {}", event.order_id);
            emitter.publish_event(event.clone()).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

fn validate_window(order: &NewOrder) -> Result<(), OrderFlowError> {
    if order.delivery_window_start >= order.delivery_window_end {
        return Err(OrderFlowError::validation("delivery_window_end", "Delivery window end must be after start."));
    }
    Ok(())
}
