//! Data types that are stored in, or retrieved from, the database. These types are public and shared between the
//! storage layer, the engine API and the server.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use cmb_common::Money;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::new_order_id;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------        OrderId        -------------------------------------------------------
/// The external, immutable identifier of an order, e.g. `ORD-7KQ2M-ER`. Assigned once, when the order draft is
/// created, and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
/// The canonical order lifecycle vocabulary. `Pending` is the initial status; `Completed` and `Cancelled` are
/// terminal and reject every further transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been placed by the client and is waiting for the chef.
    Pending,
    /// The chef has accepted the order.
    Accepted,
    /// The chef is preparing the order.
    Cooking,
    /// The order is ready for pickup by a dispatch driver.
    Ready,
    /// A dispatch driver has picked the order up.
    Dispatched,
    /// The order has been handed to the client. Triggers the final payout release.
    Delivered,
    /// The order has been completed. Terminal.
    Completed,
    /// The order has been cancelled by the client, chef, or an admin. Terminal.
    Cancelled,
}

impl OrderStatusType {
    /// Terminal statuses reject all further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Completed | OrderStatusType::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::Pending => "pending",
            OrderStatusType::Accepted => "accepted",
            OrderStatusType::Cooking => "cooking",
            OrderStatusType::Ready => "ready",
            OrderStatusType::Dispatched => "dispatched",
            OrderStatusType::Delivered => "delivered",
            OrderStatusType::Completed => "completed",
            OrderStatusType::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "cooking" => Ok(Self::Cooking),
            "ready" => Ok(Self::Ready),
            "dispatched" => Ok(Self::Dispatched),
            "delivered" => Ok(Self::Delivered),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
/// The order aggregate root. Combines the cart snapshot reference, the escrow split, the delivery window and the
/// lifecycle status. Orders are never hard-deleted; cancellation is a terminal status, not a row deletion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    /// Reference to the priced cart snapshot this order was placed from.
    pub cart_id: String,
    pub client_id: i64,
    pub chef_id: i64,
    pub dispatch_id: Option<i64>,
    pub total_price: Money,
    pub grocery_advance_amount: Money,
    pub platform_fee_amount: Money,
    pub final_payout_amount: Money,
    pub paid: bool,
    pub delivery_window_start: DateTime<Utc>,
    pub delivery_window_end: DateTime<Utc>,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder       --------------------------------------------------------
/// A draft order as submitted by a client, before persistence. The `order_id` is generated here and is immutable
/// from this point on.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    /// Reference to the priced cart snapshot. Cart contents and pricing live with the catalogue collaborator.
    pub cart_id: String,
    pub client_id: i64,
    pub chef_id: i64,
    /// The total of the cart snapshot, as priced by the catalogue collaborator.
    pub total_price: Money,
    pub delivery_window_start: DateTime<Utc>,
    pub delivery_window_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(
        cart_id: String,
        client_id: i64,
        chef_id: i64,
        total_price: Money,
        delivery_window_start: DateTime<Utc>,
        delivery_window_end: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: new_order_id(),
            cart_id,
            client_id,
            chef_id,
            total_price,
            delivery_window_start,
            delivery_window_end,
            created_at: Utc::now(),
        }
    }
}

//--------------------------------------    LedgerEntryType    -------------------------------------------------------
/// The kind of money movement a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    /// Upfront advance held for the chef's grocery shopping.
    GroceryAdvance,
    /// The platform's cut, held at order placement.
    PlatformFee,
    /// The remainder released to the chef on delivery.
    FinalPayout,
    /// A post-hoc adjustment from dispute resolution. May be negative.
    Refund,
}

impl Display for LedgerEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LedgerEntryType::GroceryAdvance => "grocery_advance",
            LedgerEntryType::PlatformFee => "platform_fee",
            LedgerEntryType::FinalPayout => "final_payout",
            LedgerEntryType::Refund => "refund",
        };
        write!(f, "{s}")
    }
}

impl FromStr for LedgerEntryType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grocery_advance" => Ok(Self::GroceryAdvance),
            "platform_fee" => Ok(Self::PlatformFee),
            "final_payout" => Ok(Self::FinalPayout),
            "refund" => Ok(Self::Refund),
            s => Err(ConversionError(format!("Invalid ledger entry type: {s}"))),
        }
    }
}

//--------------------------------------      LedgerEntry      -------------------------------------------------------
/// One immutable money movement tied to an order. The ledger is append-only: there is no update or delete path
/// anywhere in the engine, and the sum of an order's entries is the audit source of truth for its escrow.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub order_id: OrderId,
    pub entry_type: LedgerEntryType,
    /// Signed amount in cents. Refunds are typically negative.
    pub amount: Money,
    /// Free-text external reference, e.g. the gateway hold token.
    pub reference: String,
    pub processed_at: DateTime<Utc>,
}

//--------------------------------------    StatusTransition   -------------------------------------------------------
/// One immutable audit row capturing a single change in an order's lifecycle status, including the implicit
/// initial `pending` entry written at order creation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StatusTransition {
    pub id: i64,
    pub order_id: OrderId,
    pub status: OrderStatusType,
    /// The actor that triggered the change, when known.
    pub changed_by: Option<i64>,
    pub notes: String,
    pub changed_at: DateTime<Utc>,
}

//--------------------------------------     DisputeStatus     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    InReview,
    Resolved,
}

impl Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DisputeStatus::Open => "open",
            DisputeStatus::InReview => "in_review",
            DisputeStatus::Resolved => "resolved",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DisputeStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_review" => Ok(Self::InReview),
            "resolved" => Ok(Self::Resolved),
            s => Err(ConversionError(format!("Invalid dispute status: {s}"))),
        }
    }
}

//--------------------------------------     DisputeTicket     -------------------------------------------------------
/// A client-raised dispute against one of their orders. Resolution is admin-only and may carry a payout
/// adjustment, which lands in the escrow ledger as a `refund` entry.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DisputeTicket {
    pub id: i64,
    pub order_id: OrderId,
    pub raised_by: i64,
    pub description: String,
    pub status: DisputeStatus,
    pub resolution_notes: String,
    pub payout_adjustment: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDispute {
    pub order_id: OrderId,
    pub raised_by: i64,
    pub description: String,
}

//--------------------------------------     DeliveryProof     -------------------------------------------------------
/// Proof of delivery submitted by a dispatch driver. Submission drives the `delivered` transition.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeliveryProof {
    pub id: i64,
    pub order_id: OrderId,
    pub signature: String,
    pub photo_url: Option<String>,
    pub submitted_by: i64,
    pub submitted_at: DateTime<Utc>,
}

//--------------------------------------      OrderRating      -------------------------------------------------------
/// A client rating for a delivered or completed order. One per order; re-rating replaces the previous value.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderRating {
    pub id: i64,
    pub order_id: OrderId,
    pub rating: i64,
    pub report: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------         Role          -------------------------------------------------------
/// The actor roles known to the marketplace. Authentication itself is handled by an upstream collaborator; the
/// engine and server only ever see an already-verified actor id and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Chef,
    Dispatch,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Client => "client",
            Role::Chef => "chef",
            Role::Dispatch => "dispatch",
            Role::Admin => "admin",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "chef" => Ok(Self::Chef),
            "dispatch" => Ok(Self::Dispatch),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for s in ["pending", "accepted", "cooking", "ready", "dispatched", "delivered", "completed", "cancelled"] {
            let status: OrderStatusType = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
        assert!("Paid".parse::<OrderStatusType>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatusType::Completed.is_terminal());
        assert!(OrderStatusType::Cancelled.is_terminal());
        assert!(!OrderStatusType::Pending.is_terminal());
        assert!(!OrderStatusType::Delivered.is_terminal());
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&OrderStatusType::Dispatched).unwrap(), "\"dispatched\"");
        assert_eq!(serde_json::to_string(&LedgerEntryType::GroceryAdvance).unwrap(), "\"grocery_advance\"");
        assert_eq!(serde_json::to_string(&DisputeStatus::InReview).unwrap(), "\"in_review\"");
    }

    #[test]
    fn new_order_generates_an_id() {
        let order = NewOrder::new(
            "cart-1".to_string(),
            1,
            2,
            cmb_common::Money::from_dollars(10),
            chrono::Utc::now(),
            chrono::Utc::now() + chrono::Duration::hours(2),
        );
        assert!(order.order_id.as_str().starts_with("ORD-"));
        assert!(order.order_id.as_str().ends_with("-ER"));
    }
}
