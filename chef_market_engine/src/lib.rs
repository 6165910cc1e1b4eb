//! Chef Market Engine
//!
//! The Chef Market Engine is the order lifecycle and escrow/payout core of the Chef Market backend: it turns a
//! priced cart into an order with a financial split, guards chefs against double-booked delivery windows, drives
//! orders through the status state machine, and records every status change and money movement as immutable rows.
//! This library contains the core logic only; it is transport-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly. Instead, use the public API provided by the engine. The exception is the data
//!    types used in the database. These are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@cme_api`]). This provides the public-facing functionality of the engine. It is
//!    responsible for placing orders, moving them through their lifecycle, and reconciling disputes against the
//!    escrow ledger. Backends implement the traits in the [`mod@traits`] module in order to drive the API.
//! 3. The escrow arithmetic ([`mod@escrow`]). A pure payment-split calculator with no I/O of its own.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted when certain
//! actions occur within the engine. For example, when an order changes status, a `StatusChangedEvent` is emitted.
//! A simple actor framework is used so that you can easily hook into these events and perform custom actions.
//! Event delivery is best-effort by contract: a subscriber that is down never fails the operation that emitted
//! the event.

pub mod db_types;
pub mod escrow;
pub mod events;
pub mod gateway;
pub mod helpers;
pub mod traits;

mod cme_api;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "test_utils")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use cme_api::{
    dispute_api::DisputeApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    order_objects::{OrderResult, StatusChange},
};
pub use traits::{
    DisputeError,
    DisputeManagement,
    GatewayError,
    OrderFlowDatabase,
    OrderFlowError,
    OrderManagement,
    PaymentGateway,
};
