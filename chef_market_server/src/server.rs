use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use chef_market_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    gateway::LogOnlyGateway,
    DisputeApi,
    OrderFlowApi,
    SqliteDatabase,
};
use futures::FutureExt;
use log::info;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        DeliveryProofRoute,
        DisputeByIdRoute,
        NewDisputeRoute,
        NewOrderRoute,
        OrderByIdRoute,
        RateOrderRoute,
        ResolveDisputeRoute,
        UpdateStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    // The realtime fan-out transport is a collaborator. The default subscriber records every broadcast in the
    // log; swapping in a websocket or message-bus subscriber is a matter of registering a different hook.
    let mut hooks = EventHooks::default();
    hooks.on_status_changed(|ev| {
        async move {
            info!("📬️ Order {} is now {}", ev.order_id, ev.status);
        }
        .boxed()
    });
    let handlers = EventHandlers::new(64, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let ratios = config.escrow;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), LogOnlyGateway, ratios, producers.clone());
        let disputes_api = DisputeApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cmb::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(disputes_api))
            .service(health)
            .service(NewOrderRoute::<SqliteDatabase, LogOnlyGateway>::new())
            .service(OrderByIdRoute::<SqliteDatabase, LogOnlyGateway>::new())
            .service(UpdateStatusRoute::<SqliteDatabase, LogOnlyGateway>::new())
            .service(DeliveryProofRoute::<SqliteDatabase, LogOnlyGateway>::new())
            .service(RateOrderRoute::<SqliteDatabase, LogOnlyGateway>::new())
            .service(NewDisputeRoute::<SqliteDatabase>::new())
            .service(DisputeByIdRoute::<SqliteDatabase>::new())
            .service(ResolveDisputeRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
