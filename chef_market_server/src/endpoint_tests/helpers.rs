use chef_market_engine::{
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    SqliteDatabase,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

pub async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

pub fn order_body(chef_id: i64, cents: i64, start_h: i64, end_h: i64) -> Value {
    let now = Utc::now();
    json!({
        "cart_id": "cart-1",
        "chef_id": chef_id,
        "total_price": cents,
        "delivery_window_start": now + Duration::hours(start_h),
        "delivery_window_end": now + Duration::hours(end_h),
    })
}

/// Builds a test service with the full route table over the given database and default ratios. The one-argument
/// form uses the demo gateway; pass a gateway type and value to supply a recording or failing one.
macro_rules! test_app {
    ($db:expr) => {
        test_app!($db, chef_market_engine::gateway::LogOnlyGateway, chef_market_engine::gateway::LogOnlyGateway)
    };
    ($db:expr, $gateway_ty:ty, $gateway:expr) => {{
        let orders_api = chef_market_engine::OrderFlowApi::new(
            $db.clone(),
            $gateway,
            chef_market_engine::escrow::SplitRatios::default(),
            chef_market_engine::events::EventProducers::default(),
        );
        let disputes_api = chef_market_engine::DisputeApi::new($db.clone());
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(orders_api))
                .app_data(actix_web::web::Data::new(disputes_api))
                .service($crate::routes::health)
                .service($crate::routes::NewOrderRoute::<chef_market_engine::SqliteDatabase, $gateway_ty>::new())
                .service($crate::routes::OrderByIdRoute::<chef_market_engine::SqliteDatabase, $gateway_ty>::new())
                .service($crate::routes::UpdateStatusRoute::<chef_market_engine::SqliteDatabase, $gateway_ty>::new())
                .service($crate::routes::DeliveryProofRoute::<chef_market_engine::SqliteDatabase, $gateway_ty>::new())
                .service($crate::routes::RateOrderRoute::<chef_market_engine::SqliteDatabase, $gateway_ty>::new())
                .service($crate::routes::NewDisputeRoute::<chef_market_engine::SqliteDatabase>::new())
                .service($crate::routes::DisputeByIdRoute::<chef_market_engine::SqliteDatabase>::new())
                .service($crate::routes::ResolveDisputeRoute::<chef_market_engine::SqliteDatabase>::new()),
        )
        .await
    }};
}

pub(crate) use test_app;
