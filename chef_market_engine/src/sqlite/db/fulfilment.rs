//! Statements for delivery proofs and order ratings.

use sqlx::SqliteConnection;

use crate::{
    db_types::{DeliveryProof, OrderId, OrderRating},
    traits::OrderFlowError,
};

/// Inserts or replaces the delivery proof for an order.
pub async fn upsert_proof(
    order_id: &OrderId,
    signature: &str,
    photo_url: Option<String>,
    submitted_by: i64,
    conn: &mut SqliteConnection,
) -> Result<DeliveryProof, OrderFlowError> {
    let proof: DeliveryProof = sqlx::query_as(
        r#"
            INSERT INTO delivery_proofs (order_id, signature, photo_url, submitted_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id) DO UPDATE SET
                signature = excluded.signature,
                photo_url = excluded.photo_url,
                submitted_by = excluded.submitted_by,
                submitted_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(signature)
    .bind(photo_url)
    .bind(submitted_by)
    .fetch_one(conn)
    .await?;
    Ok(proof)
}

pub async fn fetch_proof(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<DeliveryProof>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM delivery_proofs WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await
}

/// Inserts or replaces the client rating for an order.
pub async fn upsert_rating(
    order_id: &OrderId,
    rating: i64,
    report: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<OrderRating, OrderFlowError> {
    let rating: OrderRating = sqlx::query_as(
        r#"
            INSERT INTO order_ratings (order_id, rating, report)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id) DO UPDATE SET
                rating = excluded.rating,
                report = excluded.report,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(rating)
    .bind(report)
    .fetch_one(conn)
    .await?;
    Ok(rating)
}

pub async fn fetch_rating(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<OrderRating>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_ratings WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await
}
