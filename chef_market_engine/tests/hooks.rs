//! Verifies that status changes reach realtime subscribers through the event hook channel, and that the
//! idempotent degenerate case stays silent.

mod support;

use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc,
};

use chef_market_engine::{
    db_types::OrderStatusType,
    escrow::SplitRatios,
    events::{EventHandler, EventProducers, StatusChangedEvent},
    OrderFlowApi,
    SqliteDatabase,
};
use futures_util::FutureExt;
use log::info;
use support::{
    draft,
    gateway::RecordingGateway,
    prepare_env::{prepare_test_env, random_db_path},
    window,
};

#[tokio::test]
async fn status_changes_are_broadcast_best_effort() {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");

    let count = Arc::new(AtomicI32::new(0));
    let seen = count.clone();
    let handler = Arc::new(move |ev: StatusChangedEvent| {
        let seen = seen.clone();
        async move {
            info!("🪝️ {ev:?}");
            seen.fetch_add(1, Ordering::SeqCst);
        }
        .boxed()
    });
    let event_handler = EventHandler::new(16, handler);
    let producers = EventProducers { status_changed_producer: vec![event_handler.subscribe()] };

    let api = OrderFlowApi::new(db, RecordingGateway::default(), SplitRatios::default(), producers);
    let order = api.place_order(draft(1, 10, 5_000, window(4, 6))).await.unwrap();
    let oid = order.order_id.clone();

    api.transition_order(&oid, OrderStatusType::Accepted, None, "").await.unwrap();
    api.transition_order(&oid, OrderStatusType::Cooking, None, "").await.unwrap();
    // The idempotent repeat changes nothing and must not be broadcast.
    api.transition_order(&oid, OrderStatusType::Cooking, None, "").await.unwrap();

    // Dropping the api drops the producers, which lets the handler drain and shut down.
    drop(api);
    event_handler.start_handler().await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}
