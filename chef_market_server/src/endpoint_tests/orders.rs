use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use super::helpers::{new_db, order_body, test_app};

fn as_actor(req: test::TestRequest, id: i64, role: &str) -> test::TestRequest {
    req.insert_header(("cmb-actor-id", id.to_string())).insert_header(("cmb-actor-role", role.to_string()))
}

#[actix_web::test]
async fn placing_an_order_returns_201_with_the_split() {
    let db = new_db().await;
    let app = test_app!(db);
    let req = as_actor(test::TestRequest::post().uri("/orders"), 10, "client")
        .set_json(order_body(1, 14_200, 4, 6))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["paid"], true);
    assert_eq!(body["client_id"], 10);
    assert_eq!(body["total_price"], 14_200);
    assert_eq!(body["grocery_advance_amount"], 5_680);
    assert_eq!(body["platform_fee_amount"], 1_704);
    assert_eq!(body["final_payout_amount"], 6_816);
}

#[actix_web::test]
async fn schedule_conflicts_come_back_as_400() {
    let db = new_db().await;
    let app = test_app!(db);
    let req = as_actor(test::TestRequest::post().uri("/orders"), 10, "client")
        .set_json(order_body(1, 5_000, 4, 6))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = as_actor(test::TestRequest::post().uri("/orders"), 11, "client")
        .set_json(order_body(1, 5_000, 5, 7))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("delivery window"), "unexpected body: {body}");
}

#[actix_web::test]
async fn an_inverted_window_reports_the_offending_field() {
    let db = new_db().await;
    let app = test_app!(db);
    let req = as_actor(test::TestRequest::post().uri("/orders"), 10, "client")
        .set_json(order_body(1, 5_000, 6, 4))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["field"], "delivery_window_end");
}

#[actix_web::test]
async fn actors_are_required_and_role_gated() {
    let db = new_db().await;
    let app = test_app!(db);
    // No actor headers at all.
    let req = test::TestRequest::post().uri("/orders").set_json(order_body(1, 5_000, 4, 6)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    // A chef cannot place an order.
    let req = as_actor(test::TestRequest::post().uri("/orders"), 1, "chef")
        .set_json(order_body(1, 5_000, 4, 6))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn status_destinations_are_role_gated_and_terminal_orders_reject() {
    let db = new_db().await;
    let app = test_app!(db);
    let req = as_actor(test::TestRequest::post().uri("/orders"), 10, "client")
        .set_json(order_body(1, 5_000, 4, 6))
        .to_request();
    let order: Value = test::call_and_read_body_json(&app, req).await;
    let oid = order["order_id"].as_str().unwrap().to_string();

    // Only dispatch (or admin) may move an order to dispatched.
    let req = as_actor(test::TestRequest::post().uri(&format!("/orders/{oid}/status")), 10, "client")
        .set_json(json!({ "status": "dispatched" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // The client may cancel their own pending order.
    let req = as_actor(test::TestRequest::post().uri(&format!("/orders/{oid}/status")), 10, "client")
        .set_json(json!({ "status": "cancelled", "notes": "changed my mind" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Cancelled is terminal; even an admin gets a 400 naming the current status.
    let req = as_actor(test::TestRequest::post().uri(&format!("/orders/{oid}/status")), 1, "admin")
        .set_json(json!({ "status": "accepted" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("cancelled"), "unexpected body: {body}");
}

#[actix_web::test]
async fn delivery_proof_is_dispatch_only_and_delivers_the_order() {
    let db = new_db().await;
    let gateway = chef_market_engine::test_utils::gateway::RecordingGateway::default();
    let app = test_app!(db, chef_market_engine::test_utils::gateway::RecordingGateway, gateway.clone());
    let req = as_actor(test::TestRequest::post().uri("/orders"), 10, "client")
        .set_json(order_body(1, 14_200, 4, 6))
        .to_request();
    let order: Value = test::call_and_read_body_json(&app, req).await;
    let oid = order["order_id"].as_str().unwrap().to_string();

    let req = as_actor(test::TestRequest::post().uri(&format!("/orders/{oid}/delivery-proof")), 10, "client")
        .set_json(json!({ "signature": "scribble" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = as_actor(test::TestRequest::post().uri(&format!("/orders/{oid}/delivery-proof")), 77, "dispatch")
        .set_json(json!({ "signature": "scribble" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["order"]["status"], "delivered");
    assert_eq!(body["proof"]["submitted_by"], 77);
    // The final payout of $68.16 went out the moment the order was delivered.
    assert_eq!(gateway.releases().len(), 1);

    // Delivered unlocks the client rating.
    let req = as_actor(test::TestRequest::post().uri(&format!("/orders/{oid}/rating")), 10, "client")
        .set_json(json!({ "rating": 5, "report": "superb" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}
