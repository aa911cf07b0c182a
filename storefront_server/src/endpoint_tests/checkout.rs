use actix_web::{
    http::StatusCode,
    test::{self, TestRequest},
};
use storefront_common::Cents;
use storefront_engine::{
    cart::MAX_LINE_QUANTITY,
    db_types::{OrderStatusType, PaymentMethod},
    payments::CheckoutAction,
    traits::PaymentLedgerDatabase,
};

use super::helpers::{checkout_body, setup, test_app};
use crate::data_objects::CheckoutResponse;

#[actix_web::test]
async fn kenya_checkout_sends_a_push_prompt() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("Kenya", Some("w@example.com"), &[("velvet-bloom", 2)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp.status, OrderStatusType::Pending);
    assert_eq!(resp.total, Cents::from(17_800));
    assert!(matches!(resp.payment, CheckoutAction::PushPromptSent { .. }));

    let order = shop.db.fetch_order_by_order_id(&resp.order_id).await.unwrap().unwrap();
    assert_eq!(order.payment_method, PaymentMethod::MobileMoney);
    assert_eq!(order.status, OrderStatusType::Pending);
}

#[actix_web::test]
async fn uk_checkout_redirects_to_the_card_processor() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("UK", None, &[("midnight-whisper", 1), ("scent-notes", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    // $75.00 + $9.99
    assert_eq!(resp.total, Cents::from(8_499));
    match resp.payment {
        CheckoutAction::RedirectToProcessor { url } => assert!(url.starts_with("https://pay.example.com/session/")),
        other => panic!("Unexpected checkout action: {other:?}"),
    }
}

#[actix_web::test]
async fn unmapped_country_gets_settlement_instructions() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("Mongolia", None, &[("velvet-bloom", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    match resp.payment {
        CheckoutAction::SettlementInstructions { instructions } => {
            assert!(instructions.contains(resp.order_id.as_str()));
        },
        other => panic!("Unexpected checkout action: {other:?}"),
    }
}

#[actix_web::test]
async fn empty_cart_is_rejected() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("Kenya", None, &[]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn blank_buyer_fields_are_rejected() {
    let shop = setup().await;
    let app = test_app!(shop);
    let mut body = checkout_body("Kenya", None, &[("velvet-bloom", 1)]);
    body["name"] = serde_json::json!("   ");
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn carts_with_unknown_products_are_rejected() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("Kenya", None, &[("discontinued-scent", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn runaway_quantities_are_capped_through_checkout() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("Kenya", None, &[("velvet-bloom", 2_000_000_000_000_000)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    // $89.00 x the line ceiling, stored without wrapping.
    assert_eq!(resp.total, Cents::from(8900) * MAX_LINE_QUANTITY);
    let items = shop.db.fetch_line_items(&resp.order_id).await.unwrap();
    assert_eq!(items[0].quantity, MAX_LINE_QUANTITY);
}

#[actix_web::test]
async fn digital_quantities_are_pinned_through_checkout() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("Kenya", Some("w@example.com"), &[("scent-notes", 5)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    // One copy, not five.
    assert_eq!(resp.total, Cents::from(999));
    let items = shop.db.fetch_line_items(&resp.order_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 1);
}
