//! Operator endpoints, registered under the token-guarded `/admin` scope (see [`crate::server`]).
//!
//! Paths here are relative to the scope: `POST /admin/products`, `DELETE /admin/orders`, and so on.

use actix_web::{delete, get, post, web, HttpResponse};
use log::*;
use storefront_engine::{
    db_types::{NewProduct, OrderId, ProductId},
    vault::AssetVault,
    CatalogApi,
    OrderLedgerApi,
    SqliteDatabase,
};

use crate::{
    data_objects::{AssetUploadParams, PurgeResult},
    errors::ServerError,
};

//----------------------------------------------   Catalog  ----------------------------------------------------
/// Unlike the storefront listing, this includes deactivated products.
#[get("/products")]
pub async fn admin_products(catalog: web::Data<CatalogApi<SqliteDatabase>>) -> Result<HttpResponse, ServerError> {
    let products = catalog.all_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

/// Creates or updates a catalog entry. Upserting an existing id reactivates it; the vault handle is untouched.
#[post("/products")]
pub async fn upsert_product(
    body: web::Json<NewProduct>,
    catalog: web::Data<CatalogApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let product = catalog.upsert(body.into_inner()).await?;
    info!("🗂️ Product {} upserted ({})", product.id, product.price);
    Ok(HttpResponse::Ok().json(product))
}

/// Soft delete. The row stays so historical line items keep a referent; the storefront stops listing it.
#[delete("/products/{id}")]
pub async fn deactivate_product(
    path: web::Path<String>,
    catalog: web::Data<CatalogApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let id = ProductId::from(path.into_inner());
    let product = catalog.deactivate(&id).await?;
    info!("🗂️ Product {id} deactivated");
    Ok(HttpResponse::Ok().json(product))
}

/// Uploads the raw ebook payload. It is encrypted into the vault off-executor and only the opaque handle lands on
/// the catalog entry.
#[post("/products/{id}/asset")]
pub async fn upload_asset(
    path: web::Path<String>,
    params: web::Query<AssetUploadParams>,
    body: web::Bytes,
    catalog: web::Data<CatalogApi<SqliteDatabase>>,
    vault: web::Data<AssetVault>,
) -> Result<HttpResponse, ServerError> {
    let id = ProductId::from(path.into_inner());
    if body.is_empty() {
        return Err(ServerError::InvalidRequestBody("The asset payload is empty".to_string()));
    }
    let vault = vault.get_ref().clone();
    let handle =
        web::block(move || vault.store(&body)).await.map_err(|e| ServerError::Unspecified(e.to_string()))??;
    let product = catalog.attach_asset(&id, &handle, params.preview.as_deref()).await?;
    info!("🔏️ Encrypted asset attached to product {id}");
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Orders  ----------------------------------------------------
#[get("/orders")]
pub async fn admin_orders(orders: web::Data<OrderLedgerApi<SqliteDatabase>>) -> Result<HttpResponse, ServerError> {
    let all = orders.list_orders().await?;
    Ok(HttpResponse::Ok().json(all))
}

/// Records handover of the goods. For manual-settlement orders this is also how payment receipt is recorded, since
/// no provider will ever confirm them.
#[post("/orders/{id}/fulfill")]
pub async fn fulfill_order(
    path: web::Path<String>,
    orders: web::Data<OrderLedgerApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    let order = orders.mark_fulfilled(&order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// Deletes every order, and with them every entitlement. Documented, deliberate, and irreversible.
#[delete("/orders")]
pub async fn purge_orders(orders: web::Data<OrderLedgerApi<SqliteDatabase>>) -> Result<HttpResponse, ServerError> {
    let deleted = orders.purge_all().await?;
    Ok(HttpResponse::Ok().json(PurgeResult { deleted }))
}
