use actix_web::{
    http::StatusCode,
    test::{self, TestRequest},
};
use storefront_engine::{
    db_types::{Product, ProductId},
    traits::CatalogManagement,
};

use super::helpers::{setup, test_app};

#[actix_web::test]
async fn health_check() {
    let shop = setup().await;
    let app = test_app!(shop);
    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn product_listing_shows_active_entries_only() {
    let shop = setup().await;
    let app = test_app!(shop);
    let req = TestRequest::get().uri("/api/products").to_request();
    let products: Vec<Product> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(products.len(), 3);

    shop.db.deactivate_product(&ProductId::from("midnight-whisper")).await.unwrap();
    let req = TestRequest::get().uri("/api/products").to_request();
    let products: Vec<Product> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| p.id.as_str() != "midnight-whisper"));
}

#[actix_web::test]
async fn product_detail_includes_the_ungated_preview() {
    let shop = setup().await;
    let app = test_app!(shop);
    let req = TestRequest::get().uri("/api/products/scent-notes").to_request();
    let product: Product = test::call_and_read_body_json(&app, req).await;
    assert_eq!(product.name, "Scent Notes: A Beginner's Guide to Fragrance");
    assert!(product.preview.as_deref().unwrap_or_default().contains("Chapter one"));
}

#[actix_web::test]
async fn unknown_and_deactivated_products_are_not_found() {
    let shop = setup().await;
    let app = test_app!(shop);
    let req = TestRequest::get().uri("/api/products/no-such-thing").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    shop.db.deactivate_product(&ProductId::from("velvet-bloom")).await.unwrap();
    let req = TestRequest::get().uri("/api/products/velvet-bloom").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
