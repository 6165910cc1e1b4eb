//! Shared scaffolding for the engine integration tests: a temp SQLite database per test, a recording payment
//! gateway, and draft-order helpers.
#![allow(dead_code)]

pub mod gateway;
pub mod prepare_env;

use chrono::{DateTime, Duration, Utc};
use cmb_common::Money;
use chef_market_engine::{
    db_types::NewOrder,
    escrow::SplitRatios,
    events::EventProducers,
    OrderFlowApi,
    OrderFlowDatabase,
    SqliteDatabase,
};
use gateway::RecordingGateway;
use log::error;
use prepare_env::{prepare_test_env, random_db_path};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub struct TestContext {
    pub url: String,
    pub gateway: RecordingGateway,
    pub api: OrderFlowApi<SqliteDatabase, RecordingGateway>,
}

pub async fn setup() -> TestContext {
    setup_with_gateway(RecordingGateway::default()).await
}

pub async fn setup_with_gateway(gateway: RecordingGateway) -> TestContext {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let api = OrderFlowApi::new(db, gateway.clone(), SplitRatios::default(), EventProducers::default());
    TestContext { url, gateway, api }
}

pub async fn tear_down(mut ctx: TestContext) {
    if let Err(e) = ctx.api.db_mut().close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    Sqlite::drop_database(&ctx.url).await.unwrap();
}

/// A delivery window `[now + start_h, now + end_h)`.
pub fn window(start_h: i64, end_h: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let now = Utc::now();
    (now + Duration::hours(start_h), now + Duration::hours(end_h))
}

pub fn draft(chef_id: i64, client_id: i64, cents: i64, win: (DateTime<Utc>, DateTime<Utc>)) -> NewOrder {
    NewOrder::new(format!("cart-{client_id}-{chef_id}"), client_id, chef_id, Money::from_cents(cents), win.0, win.1)
}
