//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will
//! cause the current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation
//! (e.g. I/O, database operations, etc.) must be expressed as futures or asynchronous functions, which the
//! handlers here do throughout.

use actix_web::{get, web, HttpResponse, Responder};
use chef_market_engine::{
    db_types::{NewOrder, OrderId, OrderStatusType, Role},
    DisputeApi,
    DisputeManagement,
    OrderFlowApi,
    OrderFlowDatabase,
    OrderFlowError,
    OrderManagement,
    PaymentGateway,
};
use log::*;
use serde_json::json;

use crate::{
    auth::{require_role, Actor},
    data_objects::{
        DeliveryProofParams,
        NewDisputeParams,
        NewOrderParams,
        RatingParams,
        ResolveDisputeParams,
        StatusUpdateParams,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// Which roles may move an order to the given destination status. Admin can do anything; the others follow the
/// division of labour: the chef runs the kitchen, dispatch runs the road, the client closes the loop.
fn roles_for_destination(status: OrderStatusType) -> &'static [Role] {
    use OrderStatusType::*;
    match status {
        Pending => &[Role::Admin],
        Accepted | Cooking | Ready => &[Role::Chef, Role::Admin],
        Dispatched | Delivered => &[Role::Dispatch, Role::Admin],
        Completed => &[Role::Client, Role::Admin],
        Cancelled => &[Role::Client, Role::Chef, Role::Admin],
    }
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Orders  ----------------------------------------------------

route!(new_order => Post "/orders" impl OrderFlowDatabase, PaymentGateway);
/// Route handler for placing a new order.
///
/// Clients submit the cart snapshot reference and total, the chef, and the requested delivery window. The
/// engine validates the window, checks the chef's schedule, and records the escrow split; a schedule conflict
/// or inverted window comes back as a 400 with field detail.
pub async fn new_order<B: OrderFlowDatabase, G: PaymentGateway>(
    actor: Actor,
    api: web::Data<OrderFlowApi<B, G>>,
    body: web::Json<NewOrderParams>,
) -> Result<HttpResponse, ServerError> {
    require_role(&actor, &[Role::Client])?;
    let params = body.into_inner();
    debug!("💻️ Client #{} is placing an order with chef #{}", actor.id, params.chef_id);
    let order = NewOrder::new(
        params.cart_id,
        actor.id,
        params.chef_id,
        params.total_price,
        params.delivery_window_start,
        params.delivery_window_end,
    );
    let order = api.place_order(order).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderFlowDatabase, PaymentGateway);
/// Route handler for the composite order view: the aggregate plus its escrow ledger and status history.
/// Restricted to the order's participants and admins.
pub async fn order_by_id<B: OrderFlowDatabase, G: PaymentGateway>(
    actor: Actor,
    api: web::Data<OrderFlowApi<B, G>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServerError> {
    let oid = OrderId::from(path.into_inner());
    let result = api.order_result(&oid).await?;
    let order = &result.order;
    let participant = match actor.role {
        Role::Admin => true,
        Role::Client => order.client_id == actor.id,
        Role::Chef => order.chef_id == actor.id,
        Role::Dispatch => order.dispatch_id.map(|d| d == actor.id).unwrap_or(true),
    };
    if !participant {
        return Err(ServerError::InsufficientPermissions(format!("{} is not a participant of {oid}.", actor.role)));
    }
    Ok(HttpResponse::Ok().json(result))
}

route!(update_status => Post "/orders/{order_id}/status" impl OrderFlowDatabase, PaymentGateway);
/// Route handler for order status changes.
///
/// The destination status decides which role may trigger it; an illegal transition (terminal order) is a 400
/// with the current status in the message.
pub async fn update_status<B: OrderFlowDatabase, G: PaymentGateway>(
    actor: Actor,
    api: web::Data<OrderFlowApi<B, G>>,
    path: web::Path<String>,
    body: web::Json<StatusUpdateParams>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    require_role(&actor, roles_for_destination(params.status))?;
    let oid = OrderId::from(path.into_inner());
    let notes = params.notes.unwrap_or_default();
    let change = api.transition_order(&oid, params.status, Some(actor.id), &notes).await?;
    Ok(HttpResponse::Ok().json(change))
}

route!(delivery_proof => Post "/orders/{order_id}/delivery-proof" impl OrderFlowDatabase, PaymentGateway);
/// Route handler for delivery proof submission. Dispatch only; a successful submission internally drives the
/// `delivered` transition (and with it the final payout release).
pub async fn delivery_proof<B: OrderFlowDatabase, G: PaymentGateway>(
    actor: Actor,
    api: web::Data<OrderFlowApi<B, G>>,
    path: web::Path<String>,
    body: web::Json<DeliveryProofParams>,
) -> Result<HttpResponse, ServerError> {
    require_role(&actor, &[Role::Dispatch])?;
    let oid = OrderId::from(path.into_inner());
    let params = body.into_inner();
    let (proof, change) = api.record_delivery_proof(&oid, &params.signature, params.photo_url, actor.id).await?;
    Ok(HttpResponse::Created().json(json!({ "proof": proof, "order": change.order })))
}

route!(rate_order => Post "/orders/{order_id}/rating" impl OrderFlowDatabase, PaymentGateway);
/// Route handler for order ratings. Only the client who placed the order may rate it, and only once it has
/// been delivered or completed.
pub async fn rate_order<B: OrderFlowDatabase, G: PaymentGateway>(
    actor: Actor,
    api: web::Data<OrderFlowApi<B, G>>,
    path: web::Path<String>,
    body: web::Json<RatingParams>,
) -> Result<HttpResponse, ServerError> {
    require_role(&actor, &[Role::Client])?;
    let oid = OrderId::from(path.into_inner());
    let order = api
        .db()
        .fetch_order_by_order_id(&oid)
        .await
        .map_err(ServerError::from)?
        .ok_or_else(|| ServerError::OrderFlow(OrderFlowError::OrderNotFound(oid.clone())))?;
    if order.client_id != actor.id {
        return Err(ServerError::InsufficientPermissions(
            "Only the client who placed the order can rate it.".to_string(),
        ));
    }
    let params = body.into_inner();
    let rating = api.rate_order(&oid, params.rating, params.report).await?;
    Ok(HttpResponse::Created().json(rating))
}

// ----------------------------------------------  Disputes  ---------------------------------------------------

route!(new_dispute => Post "/disputes" impl DisputeManagement);
/// Route handler for opening a dispute. Clients only, and only against their own orders.
pub async fn new_dispute<B: DisputeManagement>(
    actor: Actor,
    api: web::Data<DisputeApi<B>>,
    body: web::Json<NewDisputeParams>,
) -> Result<HttpResponse, ServerError> {
    require_role(&actor, &[Role::Client])?;
    let params = body.into_inner();
    let ticket = api.open_dispute(&params.order_id, actor.id, params.description).await?;
    Ok(HttpResponse::Created().json(ticket))
}

route!(dispute_by_id => Get "/disputes/{ticket_id}" impl DisputeManagement);
/// Route handler for fetching a dispute ticket. Visible to the raiser and to admins.
pub async fn dispute_by_id<B: DisputeManagement>(
    actor: Actor,
    api: web::Data<DisputeApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError> {
    let ticket = api.dispute(path.into_inner()).await?;
    if actor.role != Role::Admin && ticket.raised_by != actor.id {
        return Err(ServerError::InsufficientPermissions("Only the raiser or an admin may view a dispute.".to_string()));
    }
    Ok(HttpResponse::Ok().json(ticket))
}

route!(resolve_dispute => Patch "/disputes/{ticket_id}/resolve" impl DisputeManagement);
/// Route handler for dispute resolution. Admin only. A non-zero payout adjustment lands in the order's escrow
/// ledger as a `refund` entry and moves the recorded final payout.
pub async fn resolve_dispute<B: DisputeManagement>(
    actor: Actor,
    api: web::Data<DisputeApi<B>>,
    path: web::Path<i64>,
    body: web::Json<ResolveDisputeParams>,
) -> Result<HttpResponse, ServerError> {
    require_role(&actor, &[Role::Admin])?;
    let params = body.into_inner();
    let resolution = api
        .resolve_dispute(path.into_inner(), params.status, &params.resolution_notes, params.payout_adjustment)
        .await?;
    Ok(HttpResponse::Ok().json(resolution))
}
