use actix_web::{
    http::StatusCode,
    test::{self, TestRequest},
};
use storefront_engine::{
    db_types::{Order, OrderStatusType, Product},
    traits::PaymentLedgerDatabase,
};

use super::helpers::{checkout_body, setup, test_app, TEST_ADMIN_TOKEN};
use crate::data_objects::{CheckoutResponse, PurgeResult};

fn admin_get(path: &str) -> TestRequest {
    TestRequest::get().uri(path).insert_header(("X-Admin-Token", TEST_ADMIN_TOKEN))
}

fn admin_post(path: &str) -> TestRequest {
    TestRequest::post().uri(path).insert_header(("X-Admin-Token", TEST_ADMIN_TOKEN))
}

fn admin_delete(path: &str) -> TestRequest {
    TestRequest::delete().uri(path).insert_header(("X-Admin-Token", TEST_ADMIN_TOKEN))
}

#[actix_web::test]
async fn admin_scope_requires_the_token() {
    let shop = setup().await;
    let app = test_app!(shop);
    let req = TestRequest::get().uri("/admin/orders").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    let req = TestRequest::get().uri("/admin/orders").insert_header(("X-Admin-Token", "wrong")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    let req = admin_get("/admin/orders").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn product_crud_round_trip() {
    let shop = setup().await;
    let app = test_app!(shop);

    let new_product = serde_json::json!({
        "id": "amber-dusk",
        "name": "Amber Dusk",
        "description": "Warm amber with a smoky edge.",
        "price": 9500,
        "category": "Perfume",
        "image": "perfume3.jpg",
    });
    let req = admin_post("/admin/products").set_json(&new_product).to_request();
    let created: Product = test::call_and_read_body_json(&app, req).await;
    assert!(created.active);

    // Now visible on the storefront.
    let req = TestRequest::get().uri("/api/products/amber-dusk").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Deactivation hides it from shoppers but not from the admin listing.
    let req = admin_delete("/admin/products/amber-dusk").to_request();
    let gone: Product = test::call_and_read_body_json(&app, req).await;
    assert!(!gone.active);
    let req = TestRequest::get().uri("/api/products/amber-dusk").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    let req = admin_get("/admin/products").to_request();
    let all: Vec<Product> = test::call_and_read_body_json(&app, req).await;
    assert!(all.iter().any(|p| p.id.as_str() == "amber-dusk"));
}

#[actix_web::test]
async fn manual_orders_are_fulfilled_by_an_operator() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("Mongolia", None, &[("velvet-bloom", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;

    let req = admin_post(&format!("/admin/orders/{}/fulfill", resp.order_id.as_str())).to_request();
    let fulfilled: Order = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fulfilled.status, OrderStatusType::Fulfilled);

    // A second fulfillment of the same order has nothing to do.
    let req = admin_post(&format!("/admin/orders/{}/fulfill", resp.order_id.as_str())).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn fulfilling_an_unpaid_card_order_is_rejected() {
    let shop = setup().await;
    let app = test_app!(shop);
    let body = checkout_body("UK", None, &[("velvet-bloom", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;

    let req = admin_post(&format!("/admin/orders/{}/fulfill", resp.order_id.as_str())).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        shop.db.fetch_order_by_order_id(&resp.order_id).await.unwrap().unwrap().status,
        OrderStatusType::Pending
    );
}

#[actix_web::test]
async fn purge_empties_the_ledger() {
    let shop = setup().await;
    let app = test_app!(shop);
    for country in ["Kenya", "UK"] {
        let body = checkout_body(country, None, &[("velvet-bloom", 1)]);
        let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
    let req = admin_delete("/admin/orders").to_request();
    let result: PurgeResult = test::call_and_read_body_json(&app, req).await;
    assert_eq!(result.deleted, 2);
    let req = admin_get("/admin/orders").to_request();
    let orders: Vec<Order> = test::call_and_read_body_json(&app, req).await;
    assert!(orders.is_empty());
}

#[actix_web::test]
async fn ebook_upload_and_entitlement_gated_download() {
    let shop = setup().await;
    let app = test_app!(shop);
    let payload = b"%PDF-1.4 the full scent-notes manuscript".to_vec();

    // Upload the encrypted payload.
    let req = admin_post("/admin/products/scent-notes/asset").set_payload(payload.clone()).to_request();
    let product: Product = test::call_and_read_body_json(&app, req).await;
    assert!(product.asset_handle.is_some());

    // No settled order yet: the download is refused.
    let req = TestRequest::get().uri("/api/download/scent-notes?buyer=w@example.com").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    // Buy the ebook and settle via the mobile-money callback.
    let body = checkout_body("Kenya", Some("w@example.com"), &[("scent-notes", 1)]);
    let req = TestRequest::post().uri("/api/checkout").set_json(&body).to_request();
    let resp: CheckoutResponse = test::call_and_read_body_json(&app, req).await;
    let token = shop.db.fetch_order_by_order_id(&resp.order_id).await.unwrap().unwrap().correlation_token;
    let callback = format!(r#"{{"result_code":0,"result_desc":"Success","reference":"{token}"}}"#);
    let req = TestRequest::post().uri("/payments/mobile/callback").set_payload(callback).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Entitled now; the decrypted payload comes back intact.
    let req = TestRequest::get().uri("/api/download/scent-notes?buyer=w@example.com").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let served = test::read_body(resp).await;
    assert_eq!(served.as_ref(), payload.as_slice());

    // The entitlement is scoped to the buyer who paid.
    let req = TestRequest::get().uri("/api/download/scent-notes?buyer=freeloader@example.com").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}
