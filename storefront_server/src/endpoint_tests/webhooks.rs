use actix_web::{
    http::StatusCode,
    test::{self, TestRequest},
};
use storefront_engine::{
    db_types::{Order, OrderStatusType},
    helpers::calculate_hmac,
    traits::PaymentLedgerDatabase,
};

use super::helpers::{checkout_body, setup, test_app, TestShop, TEST_WEBHOOK_SECRET};
use crate::data_objects::{CheckoutResponse, JsonResponse};

async fn order_in(shop: &TestShop, resp: &CheckoutResponse) -> Order {
    shop.db.fetch_order_by_order_id(&resp.order_id).await.unwrap().unwrap()
}

fn signed_webhook(event: &str, token: &str) -> TestRequest {
    let body = format!(r#"{{"event":"{event}","reference":"{token}"}}"#);
    let signature = calculate_hmac(TEST_WEBHOOK_SECRET, body.as_bytes());
    TestRequest::post().uri("/payments/card/webhook").insert_header(("X-Flame-Signature", signature)).set_payload(body)
}

#[actix_web::test]
async fn signed_webhook_settles_the_order_exactly_once() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("UK", None, &[("velvet-bloom", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    let order = order_in(&shop, &resp).await;

    let req = signed_webhook("payment.succeeded", &order.correlation_token).to_request();
    let ack: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert!(ack.success);
    assert_eq!(order_in(&shop, &resp).await.status, OrderStatusType::Paid);

    // The provider redelivers; we acknowledge without a second transition.
    let req = signed_webhook("payment.succeeded", &order.correlation_token).to_request();
    let ack: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert!(ack.success);
    assert!(ack.message.contains("Already processed"));
    assert_eq!(order_in(&shop, &resp).await.status, OrderStatusType::Paid);
}

#[actix_web::test]
async fn failed_payment_event_fails_the_order() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("UK", None, &[("velvet-bloom", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    let order = order_in(&shop, &resp).await;

    let req = signed_webhook("payment.failed", &order.correlation_token).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(order_in(&shop, &resp).await.status, OrderStatusType::Failed);
}

#[actix_web::test]
async fn forged_or_missing_signatures_are_unauthorized() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("UK", None, &[("velvet-bloom", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    let order = order_in(&shop, &resp).await;

    let payload = format!(r#"{{"event":"payment.succeeded","reference":"{}"}}"#, order.correlation_token);
    let req = TestRequest::post()
        .uri("/payments/card/webhook")
        .insert_header(("X-Flame-Signature", "forged"))
        .set_payload(payload.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::post().uri("/payments/card/webhook").set_payload(payload).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    // Neither delivery may touch the ledger.
    assert_eq!(order_in(&shop, &resp).await.status, OrderStatusType::Pending);
}

#[actix_web::test]
async fn unknown_events_are_acknowledged_and_ignored() {
    let shop = setup().await;
    let app = test_app!(shop);
    let req = signed_webhook("charge.refunded", "whatever").to_request();
    let ack: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert!(ack.success);
}

#[actix_web::test]
async fn mobile_callback_settles_and_declines() {
    let shop = setup().await;
    let app = test_app!(shop);

    let body = checkout_body("Kenya", Some("w@example.com"), &[("velvet-bloom", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let first: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    let body = checkout_body("Tanzania", None, &[("midnight-whisper", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let second: CheckoutResponse = test::call_and_read_body_json(&app, req).await;

    let token = order_in(&shop, &first).await.correlation_token;
    let callback = format!(r#"{{"result_code":0,"result_desc":"Success","reference":"{token}"}}"#);
    let req = TestRequest::post().uri("/payments/mobile/callback").set_payload(callback).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(order_in(&shop, &first).await.status, OrderStatusType::Paid);

    let token = order_in(&shop, &second).await.correlation_token;
    let callback = format!(r#"{{"result_code":1032,"result_desc":"Cancelled by user","reference":"{token}"}}"#);
    let req = TestRequest::post().uri("/payments/mobile/callback").set_payload(callback).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(order_in(&shop, &second).await.status, OrderStatusType::Failed);
}

#[actix_web::test]
async fn callbacks_with_unknown_references_are_acknowledged_but_flagged() {
    let shop = setup().await;
    let app = test_app!(shop);
    let callback = r#"{"result_code":0,"result_desc":"Success","reference":"deadbeefdeadbeefdeadbeefdeadbeef"}"#;
    let req = TestRequest::post().uri("/payments/mobile/callback").set_payload(callback).to_request();
    let ack: JsonResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!ack.success);

    let garbage = TestRequest::post().uri("/payments/mobile/callback").set_payload("<xml/>").to_request();
    let ack: JsonResponse = test::call_and_read_body_json(&app, garbage).await;
    assert!(!ack.success);
}
