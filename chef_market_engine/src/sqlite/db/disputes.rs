//! Statements for dispute tickets.

use cmb_common::Money;
use sqlx::SqliteConnection;

use crate::{
    db_types::{DisputeStatus, DisputeTicket, NewDispute},
    traits::DisputeError,
};

pub async fn insert_dispute(dispute: NewDispute, conn: &mut SqliteConnection) -> Result<DisputeTicket, DisputeError> {
    let ticket: DisputeTicket = sqlx::query_as(
        r#"
            INSERT INTO dispute_tickets (order_id, raised_by, description)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(dispute.order_id.as_str())
    .bind(dispute.raised_by)
    .bind(dispute.description)
    .fetch_one(conn)
    .await?;
    Ok(ticket)
}

pub async fn fetch_dispute(ticket_id: i64, conn: &mut SqliteConnection) -> Result<Option<DisputeTicket>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM dispute_tickets WHERE id = $1").bind(ticket_id).fetch_optional(conn).await
}

/// Updates the resolution fields of a ticket. The ledger and order-side effects of a non-zero adjustment are
/// composed by the caller in the same transaction.
pub async fn update_resolution(
    ticket_id: i64,
    new_status: DisputeStatus,
    resolution_notes: &str,
    payout_adjustment: Money,
    conn: &mut SqliteConnection,
) -> Result<DisputeTicket, DisputeError> {
    let ticket: Option<DisputeTicket> = sqlx::query_as(
        r#"
        UPDATE dispute_tickets SET
            status = $1,
            resolution_notes = $2,
            payout_adjustment = $3,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $4 RETURNING *
        "#,
    )
    .bind(new_status.to_string())
    .bind(resolution_notes)
    .bind(payout_adjustment.value())
    .bind(ticket_id)
    .fetch_optional(conn)
    .await?;
    ticket.ok_or(DisputeError::DisputeNotFound(ticket_id))
}
