use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    escrow::PaymentSplit,
    traits::OrderFlowError,
};

/// Inserts a new order, with the schedule conflict check folded into the statement itself: the insert only
/// happens when no other non-cancelled order for the same chef overlaps the requested delivery window
/// (half-open interval test). Running check and insert as one guarded statement closes the check-then-act race
/// between two concurrent placements.
///
/// Returns [`OrderFlowError::ScheduleConflict`] when the guard rejected the row.
pub async fn insert_order_checked(
    order: NewOrder,
    split: &PaymentSplit,
    paid: bool,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let inserted: Option<Order> = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                cart_id,
                client_id,
                chef_id,
                total_price,
                grocery_advance_amount,
                platform_fee_amount,
                final_payout_amount,
                paid,
                delivery_window_start,
                delivery_window_end,
                created_at
            )
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
            WHERE NOT EXISTS (
                SELECT 1 FROM orders
                WHERE chef_id = $4
                  AND status != 'cancelled'
                  AND delivery_window_end > $10
                  AND delivery_window_start < $11
            )
            RETURNING *;
        "#,
    )
    .bind(order.order_id.clone())
    .bind(order.cart_id)
    .bind(order.client_id)
    .bind(order.chef_id)
    .bind(order.total_price.value())
    .bind(split.grocery_advance.value())
    .bind(split.platform_fee.value())
    .bind(split.final_payout.value())
    .bind(paid)
    .bind(order.delivery_window_start)
    .bind(order.delivery_window_end)
    .bind(order.created_at)
    .fetch_optional(conn)
    .await
    .map_err(|e| match e.as_database_error().map(|d| d.kind()) {
        Some(sqlx::error::ErrorKind::UniqueViolation) => OrderFlowError::OrderAlreadyExists(order.order_id.clone()),
        _ => OrderFlowError::from(e),
    })?;
    match inserted {
        Some(order) => {
            debug!("🗃️ Order {} inserted with id {}", order.order_id, order.id);
            Ok(order)
        },
        None => Err(OrderFlowError::ScheduleConflict),
    }
}

/// Returns the order with the corresponding external `order_id`, if any.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// The half-open interval overlap test against a chef's non-cancelled orders. `excluding` leaves one order out
/// of the check.
pub async fn has_schedule_conflict(
    chef_id: i64,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    excluding: Option<&OrderId>,
    conn: &mut SqliteConnection,
) -> Result<bool, OrderFlowError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM orders
        WHERE chef_id = $1
          AND status != 'cancelled'
          AND delivery_window_end > $2
          AND delivery_window_start < $3
          AND ($4 IS NULL OR order_id != $4)
        "#,
    )
    .bind(chef_id)
    .bind(window_start)
    .bind(window_end)
    .bind(excluding.map(|o| o.as_str().to_string()))
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Chef #{chef_id} has {count} conflicting orders in the requested window");
    Ok(count > 0)
}

pub(crate) async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let status = status.to_string();
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    result.ok_or(OrderFlowError::OrderIdNotFound(id))
}

/// Stores the split amounts on the order row. Used by the `accepted` backfill path when the split was not
/// recorded at placement.
pub(crate) async fn set_split_amounts(
    order_id: &OrderId,
    split: &PaymentSplit,
    paid: bool,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET
            grocery_advance_amount = $1,
            platform_fee_amount = $2,
            final_payout_amount = $3,
            paid = $4,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $5 RETURNING *
        "#,
    )
    .bind(split.grocery_advance.value())
    .bind(split.platform_fee.value())
    .bind(split.final_payout.value())
    .bind(paid)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
}

/// Moves the order's recorded final payout by `delta` (possibly negative). The dispute resolution path is the
/// only caller.
pub(crate) async fn adjust_final_payout(
    order_id: &OrderId,
    delta: cmb_common::Money,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderFlowError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET
            final_payout_amount = final_payout_amount + $1,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $2 RETURNING *
        "#,
    )
    .bind(delta.value())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
}
