//! Actor extraction.
//!
//! Authentication is an upstream concern: the proxy in front of this server verifies the caller and injects
//! the `cmb-actor-id` and `cmb-actor-role` headers. This module turns those headers into a typed [`Actor`]
//! and provides the role checks the route handlers apply.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use chef_market_engine::db_types::Role;

use crate::errors::ServerError;

pub const ACTOR_ID_HEADER: &str = "cmb-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "cmb-actor-role";

/// The verified caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl FromRequest for Actor {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_actor(req))
    }
}

fn extract_actor(req: &HttpRequest) -> Result<Actor, ServerError> {
    let id = req.headers().get(ACTOR_ID_HEADER).ok_or(ServerError::Unauthenticated)?;
    let role = req.headers().get(ACTOR_ROLE_HEADER).ok_or(ServerError::Unauthenticated)?;
    let id = id
        .to_str()
        .map_err(|e| ServerError::CouldNotDeserializeActor(e.to_string()))?
        .parse::<i64>()
        .map_err(|e| ServerError::CouldNotDeserializeActor(format!("{ACTOR_ID_HEADER}: {e}")))?;
    let role = role
        .to_str()
        .map_err(|e| ServerError::CouldNotDeserializeActor(e.to_string()))?
        .parse::<Role>()
        .map_err(|e| ServerError::CouldNotDeserializeActor(e.to_string()))?;
    Ok(Actor { id, role })
}

/// Rejects the request unless the actor holds one of the allowed roles.
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), ServerError> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(ServerError::InsufficientPermissions(format!(
            "Role {} may not perform this action.",
            actor.role
        )))
    }
}
