//! `SqliteDatabase` is a concrete implementation of a Chef Market engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module. Each write method runs as a single transaction; the low-level statements live in [`super::db`] and
//! are composed here.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use cmb_common::Money;
use log::debug;
use sqlx::SqlitePool;

use super::db::{db_url, disputes, fulfilment, ledger, new_pool, orders, transitions};
use crate::{
    db_types::{
        DeliveryProof,
        DisputeStatus,
        DisputeTicket,
        LedgerEntry,
        LedgerEntryType,
        NewDispute,
        NewOrder,
        Order,
        OrderId,
        OrderRating,
        OrderStatusType,
        StatusTransition,
    },
    escrow::PaymentSplit,
    gateway::hold_reference,
    traits::{
        DisputeError,
        DisputeManagement,
        DisputeResolution,
        OrderFlowDatabase,
        OrderFlowError,
        OrderManagement,
        PayoutInstruction,
        SplitBackfill,
        TransitionOutcome,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, taking the URL from `CMB_DATABASE_URL` or the default.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_ledger_entries(&self, order_id: &OrderId) -> Result<Vec<LedgerEntry>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let entries = ledger::entries_for_order(order_id, &mut conn).await?;
        Ok(entries)
    }

    async fn ledger_entry_count(&self, order_id: &OrderId) -> Result<i64, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let count = ledger::entry_count(order_id, &mut conn).await?;
        Ok(count)
    }

    async fn ledger_total(&self, order_id: &OrderId) -> Result<Money, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let total = ledger::total(order_id, &mut conn).await?;
        Ok(total)
    }

    async fn ledger_sum_by_type(
        &self,
        order_id: &OrderId,
        entry_type: LedgerEntryType,
    ) -> Result<Money, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let sum = ledger::sum_by_type(order_id, entry_type, &mut conn).await?;
        Ok(sum)
    }

    async fn fetch_status_history(&self, order_id: &OrderId) -> Result<Vec<StatusTransition>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let history = transitions::history_for_order(order_id, &mut conn).await?;
        Ok(history)
    }

    async fn fetch_delivery_proof(&self, order_id: &OrderId) -> Result<Option<DeliveryProof>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let proof = fulfilment::fetch_proof(order_id, &mut conn).await?;
        Ok(proof)
    }

    async fn fetch_rating(&self, order_id: &OrderId) -> Result<Option<OrderRating>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let rating = fulfilment::fetch_rating(order_id, &mut conn).await?;
        Ok(rating)
    }
}

impl OrderFlowDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_order(
        &self,
        order: NewOrder,
        split: &PaymentSplit,
        hold_ref: &str,
        paid: bool,
    ) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order_checked(order, split, paid, &mut tx).await?;
        // The initial status transition is written here, explicitly, as part of the creation unit.
        transitions::insert_transition(&order.order_id, OrderStatusType::Pending, None, "", &mut tx).await?;
        ledger::insert_entry(&order.order_id, LedgerEntryType::GroceryAdvance, split.grocery_advance, hold_ref, &mut tx)
            .await?;
        ledger::insert_entry(&order.order_id, LedgerEntryType::PlatformFee, split.platform_fee, hold_ref, &mut tx)
            .await?;
        tx.commit().await?;
        debug!("🗃️ Order {} saved with its split and initial pending transition", order.order_id);
        Ok(order)
    }

    async fn transition_order(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
        changed_by: Option<i64>,
        notes: &str,
        backfill: Option<SplitBackfill>,
    ) -> Result<TransitionOutcome, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if order.status == new_status {
            let transition = transitions::latest_matching(order_id, new_status, &mut tx).await?;
            tx.commit().await?;
            debug!("🗃️ Order {order_id} is already {new_status}. Nothing to do.");
            return Ok(TransitionOutcome { order, transition, changed: false, payout_due: None });
        }
        if order.status.is_terminal() {
            return Err(OrderFlowError::TerminalState { order_id: order_id.clone(), status: order.status });
        }
        let mut order = orders::update_order_status(order.id, new_status, &mut tx).await?;
        let transition = transitions::insert_transition(order_id, new_status, changed_by, notes, &mut tx).await?;
        let mut payout_due = None;
        match new_status {
            OrderStatusType::Accepted => {
                if let Some(backfill) = backfill {
                    // Re-check inside the transaction; the split is only backfilled into an empty ledger.
                    if ledger::entry_count(order_id, &mut tx).await? == 0 {
                        order = orders::set_split_amounts(order_id, &backfill.split, backfill.paid, &mut tx).await?;
                        ledger::insert_entry(
                            order_id,
                            LedgerEntryType::GroceryAdvance,
                            backfill.split.grocery_advance,
                            &backfill.reference,
                            &mut tx,
                        )
                        .await?;
                        ledger::insert_entry(
                            order_id,
                            LedgerEntryType::PlatformFee,
                            backfill.split.platform_fee,
                            &backfill.reference,
                            &mut tx,
                        )
                        .await?;
                    }
                }
            },
            OrderStatusType::Delivered => {
                let reference =
                    ledger::hold_reference_for(order_id, &mut tx).await?.unwrap_or_else(|| hold_reference(order_id));
                ledger::insert_entry(
                    order_id,
                    LedgerEntryType::FinalPayout,
                    order.final_payout_amount,
                    &reference,
                    &mut tx,
                )
                .await?;
                payout_due = Some(PayoutInstruction { reference, amount: order.final_payout_amount });
            },
            _ => {},
        }
        tx.commit().await?;
        Ok(TransitionOutcome { order, transition: Some(transition), changed: true, payout_due })
    }

    async fn has_schedule_conflict(
        &self,
        chef_id: i64,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        excluding_order_id: Option<&OrderId>,
    ) -> Result<bool, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        orders::has_schedule_conflict(chef_id, window_start, window_end, excluding_order_id, &mut conn).await
    }

    async fn upsert_delivery_proof(
        &self,
        order_id: &OrderId,
        signature: &str,
        photo_url: Option<String>,
        submitted_by: i64,
    ) -> Result<DeliveryProof, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        let proof = fulfilment::upsert_proof(order_id, signature, photo_url, submitted_by, &mut tx).await?;
        tx.commit().await?;
        Ok(proof)
    }

    async fn upsert_rating(
        &self,
        order_id: &OrderId,
        rating: i64,
        report: Option<String>,
    ) -> Result<OrderRating, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if !matches!(order.status, OrderStatusType::Delivered | OrderStatusType::Completed) {
            return Err(OrderFlowError::NotRateable { order_id: order_id.clone(), status: order.status });
        }
        let rating = fulfilment::upsert_rating(order_id, rating, report, &mut tx).await?;
        tx.commit().await?;
        Ok(rating)
    }

    async fn close(&mut self) -> Result<(), OrderFlowError> {
        self.pool.close().await;
        Ok(())
    }
}

impl DisputeManagement for SqliteDatabase {
    async fn create_dispute(&self, dispute: NewDispute) -> Result<DisputeTicket, DisputeError> {
        let mut tx = self.pool.begin().await?;
        orders::fetch_order_by_order_id(&dispute.order_id, &mut tx)
            .await?
            .ok_or_else(|| DisputeError::OrderNotFound(dispute.order_id.clone()))?;
        let ticket = disputes::insert_dispute(dispute, &mut tx).await?;
        tx.commit().await?;
        Ok(ticket)
    }

    async fn fetch_dispute(&self, ticket_id: i64) -> Result<Option<DisputeTicket>, DisputeError> {
        let mut conn = self.pool.acquire().await?;
        let ticket = disputes::fetch_dispute(ticket_id, &mut conn).await?;
        Ok(ticket)
    }

    async fn resolve_dispute(
        &self,
        ticket_id: i64,
        new_status: DisputeStatus,
        resolution_notes: &str,
        payout_adjustment: Money,
    ) -> Result<DisputeResolution, DisputeError> {
        let db_err = |e: OrderFlowError| DisputeError::DatabaseError(e.to_string());
        let mut tx = self.pool.begin().await?;
        let ticket =
            disputes::update_resolution(ticket_id, new_status, resolution_notes, payout_adjustment, &mut tx).await?;
        let (refund_entry, order) = if payout_adjustment.is_zero() {
            let order = orders::fetch_order_by_order_id(&ticket.order_id, &mut tx)
                .await?
                .ok_or_else(|| DisputeError::OrderNotFound(ticket.order_id.clone()))?;
            (None, order)
        } else {
            let reference = format!("DISPUTE-{ticket_id}");
            let entry = ledger::insert_entry(
                &ticket.order_id,
                LedgerEntryType::Refund,
                payout_adjustment,
                &reference,
                &mut tx,
            )
            .await
            .map_err(db_err)?;
            let order = orders::adjust_final_payout(&ticket.order_id, payout_adjustment, &mut tx).await.map_err(db_err)?;
            (Some(entry), order)
        };
        tx.commit().await?;
        Ok(DisputeResolution { ticket, refund_entry, order })
    }
}
