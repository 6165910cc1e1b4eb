//! Statements for the immutable status transition audit trail.

use sqlx::SqliteConnection;

use crate::{
    db_types::{OrderId, OrderStatusType, StatusTransition},
    traits::OrderFlowError,
};

/// Appends a status transition row. Called exactly once per status change, including the implicit initial
/// `pending` entry at order creation. That one is an explicit call on the creation path, not a database
/// trigger, so the side effect stays visible and testable.
pub async fn insert_transition(
    order_id: &OrderId,
    status: OrderStatusType,
    changed_by: Option<i64>,
    notes: &str,
    conn: &mut SqliteConnection,
) -> Result<StatusTransition, OrderFlowError> {
    let transition: StatusTransition = sqlx::query_as(
        r#"
            INSERT INTO order_status_transitions (order_id, status, changed_by, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(status.to_string())
    .bind(changed_by)
    .bind(notes)
    .fetch_one(conn)
    .await?;
    Ok(transition)
}

/// The most recent transition row matching the given status, if any. Serves the idempotent same-status case.
pub async fn latest_matching(
    order_id: &OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<StatusTransition>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM order_status_transitions WHERE order_id = $1 AND status = $2 ORDER BY id DESC LIMIT 1",
    )
    .bind(order_id.as_str())
    .bind(status.to_string())
    .fetch_optional(conn)
    .await
}

/// The order's full transition history, newest first.
pub async fn history_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<StatusTransition>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM order_status_transitions WHERE order_id = $1 ORDER BY changed_at DESC, id DESC",
    )
    .bind(order_id.as_str())
    .fetch_all(conn)
    .await
}
