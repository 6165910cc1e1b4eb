//! # Chef Market server
//! This module hosts the HTTP surface for the Chef Market order lifecycle and escrow engine. It is responsible
//! for:
//! * Accepting order placements from clients and validating them against the chef's schedule.
//! * Driving order status changes, delivery proofs and ratings through the engine.
//! * Accepting disputes and admin resolutions.
//!
//! ## Authentication
//! Authentication and identity verification are handled by an upstream collaborator. By the time a request
//! reaches this server, the proxy has verified the caller and injected the `cmb-actor-id` and `cmb-actor-role`
//! headers; the [`auth::Actor`] extractor turns those into a typed actor, and the route handlers enforce the
//! role rules.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
