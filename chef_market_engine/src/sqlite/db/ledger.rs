//! Statements for the escrow ledger. Inserts only; there is no update or delete in this module, and nothing
//! else in the crate touches the table.

use cmb_common::Money;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{LedgerEntry, LedgerEntryType, OrderId},
    traits::OrderFlowError,
};

/// Appends a single ledger entry for the order.
pub async fn insert_entry(
    order_id: &OrderId,
    entry_type: LedgerEntryType,
    amount: Money,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<LedgerEntry, OrderFlowError> {
    let entry: LedgerEntry = sqlx::query_as(
        r#"
            INSERT INTO escrow_ledger_entries (order_id, entry_type, amount, reference)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(entry_type.to_string())
    .bind(amount.value())
    .bind(reference)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Ledger: {} {} recorded for order {}", entry.entry_type, entry.amount, entry.order_id);
    Ok(entry)
}

/// All ledger entries for the order, oldest first.
pub async fn entries_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM escrow_ledger_entries WHERE order_id = $1 ORDER BY processed_at ASC, id ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await
}

pub async fn entry_count(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM escrow_ledger_entries WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_one(conn)
        .await
}

/// The sum of all entries for the order. An empty ledger sums to zero.
pub async fn total(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Money, sqlx::Error> {
    let cents: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM escrow_ledger_entries WHERE order_id = $1",
    )
    .bind(order_id.as_str())
    .fetch_one(conn)
    .await?;
    Ok(Money::from_cents(cents))
}

/// The sum of the order's entries of the given type.
pub async fn sum_by_type(
    order_id: &OrderId,
    entry_type: LedgerEntryType,
    conn: &mut SqliteConnection,
) -> Result<Money, sqlx::Error> {
    let cents: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM escrow_ledger_entries WHERE order_id = $1 AND entry_type = $2",
    )
    .bind(order_id.as_str())
    .bind(entry_type.to_string())
    .fetch_one(conn)
    .await?;
    Ok(Money::from_cents(cents))
}

/// The gateway hold reference recorded with the order's upfront entries, if the split has been recorded.
pub(crate) async fn hold_reference_for(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT reference FROM escrow_ledger_entries WHERE order_id = $1 AND entry_type = 'grocery_advance' \
         ORDER BY id ASC LIMIT 1",
    )
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await
}
