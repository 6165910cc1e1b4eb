//! The traits a storage backend (and the payment gateway collaborator) must implement to drive the engine.
//!
//! The atomicity contracts live here: implementations promise that each write method executes as a single
//! transaction, so the API layer can compose flows without worrying about partially-applied state.

mod data_objects;
mod dispute_management;
mod order_flow_database;
mod order_management;
mod payment_gateway;

pub use data_objects::{PayoutInstruction, SplitBackfill, TransitionOutcome};
pub use dispute_management::{DisputeError, DisputeManagement, DisputeResolution};
pub use order_flow_database::{OrderFlowDatabase, OrderFlowError};
pub use order_management::OrderManagement;
pub use payment_gateway::{GatewayError, PaymentGateway};
