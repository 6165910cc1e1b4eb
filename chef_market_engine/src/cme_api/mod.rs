//! The public API of the Chef Market engine. The API structs wrap a storage backend (and, for the order flow,
//! the payment gateway and event producers) and implement the business flows on top of the atomic primitives
//! the backend provides.

pub mod dispute_api;
pub mod order_flow_api;
pub mod order_objects;
