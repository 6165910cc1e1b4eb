use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use super::helpers::{new_db, order_body, test_app};

fn as_actor(req: test::TestRequest, id: i64, role: &str) -> test::TestRequest {
    req.insert_header(("cmb-actor-id", id.to_string())).insert_header(("cmb-actor-role", role.to_string()))
}

#[actix_web::test]
async fn dispute_resolution_is_admin_only_and_adjusts_the_payout() {
    let db = new_db().await;
    let app = test_app!(db);
    let req = as_actor(test::TestRequest::post().uri("/orders"), 10, "client")
        .set_json(order_body(1, 14_200, 4, 6))
        .to_request();
    let order: Value = test::call_and_read_body_json(&app, req).await;
    let oid = order["order_id"].as_str().unwrap().to_string();

    // Another client cannot dispute this order.
    let req = as_actor(test::TestRequest::post().uri("/disputes"), 99, "client")
        .set_json(json!({ "order_id": oid, "description": "cold food" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = as_actor(test::TestRequest::post().uri("/disputes"), 10, "client")
        .set_json(json!({ "order_id": oid, "description": "cold food" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let ticket: Value = test::read_body_json(resp).await;
    assert_eq!(ticket["status"], "open");
    let ticket_id = ticket["id"].as_i64().unwrap();

    // The raiser can read their ticket; a stranger cannot.
    let req = as_actor(test::TestRequest::get().uri(&format!("/disputes/{ticket_id}")), 10, "client").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = as_actor(test::TestRequest::get().uri(&format!("/disputes/{ticket_id}")), 99, "client").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // Resolution is admin-only.
    let resolve = json!({ "status": "resolved", "resolution_notes": "partial refund", "payout_adjustment": -500 });
    let req = as_actor(test::TestRequest::patch().uri(&format!("/disputes/{ticket_id}/resolve")), 10, "client")
        .set_json(resolve.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = as_actor(test::TestRequest::patch().uri(&format!("/disputes/{ticket_id}/resolve")), 1, "admin")
        .set_json(resolve)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ticket"]["status"], "resolved");
    assert_eq!(body["order"]["final_payout_amount"], 6_316);
    assert_eq!(body["refund_entry"]["entry_type"], "refund");
    assert_eq!(body["refund_entry"]["amount"], -500);

    // The refund shows up in the order's composite view.
    let req = as_actor(test::TestRequest::get().uri(&format!("/orders/{oid}")), 1, "admin").to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["ledger"].as_array().unwrap().len(), 3);
}
