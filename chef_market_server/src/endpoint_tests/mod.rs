//! Endpoint tests exercising the HTTP surface against a real temp database: status-code mapping, role gates,
//! and the wire shape of the core flows.

mod helpers;

mod disputes;
mod orders;
