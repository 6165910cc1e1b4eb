use chrono::{DateTime, Utc};
use cmb_common::Money;
use chef_market_engine::db_types::{DisputeStatus, OrderId, OrderStatusType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderParams {
    pub cart_id: String,
    pub chef_id: i64,
    /// The cart snapshot total, in cents, as priced by the catalogue collaborator.
    pub total_price: Money,
    pub delivery_window_start: DateTime<Utc>,
    pub delivery_window_end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateParams {
    pub status: OrderStatusType,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryProofParams {
    pub signature: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingParams {
    pub rating: i64,
    #[serde(default)]
    pub report: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDisputeParams {
    pub order_id: OrderId,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveDisputeParams {
    pub status: DisputeStatus,
    #[serde(default)]
    pub resolution_notes: String,
    /// Signed adjustment, in cents, applied to the order's final payout. Zero means no ledger effect.
    #[serde(default)]
    pub payout_adjustment: Money,
}
