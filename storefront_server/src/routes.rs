//! Request handler definitions for the public storefront and the payment-provider endpoints.
//!
//! Handlers here are thin: they deserialize, call into the engine APIs, and map errors onto HTTP statuses. Anything
//! that blocks (the asset vault) goes through `web::block` so a download never stalls a worker.
//!
//! The two provider endpoints have a deliberate response discipline: apart from a bad webhook signature (401),
//! every delivery we can attribute is answered in the 200 range — success, duplicate, unknown reference, or
//! unparseable payload alike — so a confused provider never settles into a retry storm against us.

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use log::*;
use storefront_engine::{
    cart::Cart,
    db_types::{NewOrder, ProductId},
    payments::{method_for_country, PaymentAdapters, PaymentConfirmation, PaymentError, PaymentOutcome},
    traits::PaymentLedgerError,
    vault::AssetVault,
    CatalogApi,
    EntitlementApi,
    OrderLedgerApi,
    SqliteDatabase,
};

use crate::{
    config::ServerOptions,
    data_objects::{CheckoutRequest, CheckoutResponse, DownloadParams, JsonResponse},
    errors::ServerError,
    helpers::client_addr,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Storefront  ----------------------------------------------------
#[get("/api/products")]
pub async fn storefront_products(
    catalog: web::Data<CatalogApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    trace!("🛍️ Product list requested");
    let products = catalog.storefront().await?;
    Ok(HttpResponse::Ok().json(products))
}

#[get("/api/products/{id}")]
pub async fn product_detail(
    path: web::Path<String>,
    catalog: web::Data<CatalogApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let id = ProductId::from(path.into_inner());
    let product =
        catalog.product(&id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("No product '{id}'")))?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
/// Turns a buyer submission into a `Pending` order and tells the client how to pay.
///
/// The payment path is fixed here by the buyer's country; the snapshot freezes names and prices; and the order id
/// plus a [`crate::data_objects::CheckoutResponse::payment`] action is everything the client gets back. The
/// correlation token never leaves the server except towards the payment provider.
#[post("/api/checkout")]
pub async fn checkout(
    body: web::Json<CheckoutRequest>,
    catalog: web::Data<CatalogApi<SqliteDatabase>>,
    orders: web::Data<OrderLedgerApi<SqliteDatabase>>,
    adapters: web::Data<PaymentAdapters>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let mut cart = Cart::new();
    for line in &request.cart {
        let product = catalog
            .product(&line.product_id)
            .await?
            .ok_or_else(|| ServerError::NoRecordFound(format!("Product '{}' is not available", line.product_id)))?;
        cart.add(&product, line.quantity);
    }
    let items = cart.snapshot(catalog.db()).await?;
    let new_order = NewOrder {
        customer_name: request.name,
        phone: request.phone,
        address: request.address,
        country: request.country.clone(),
        email: request.email,
        payment_method: method_for_country(&request.country),
    };
    let order = orders.place_order(new_order, items).await?;
    let payment = adapters.for_method(order.payment_method).begin(&order)?;
    info!("🛒️ Checkout complete: order {} via {} for {}", order.order_id, order.payment_method, order.total_price);
    Ok(HttpResponse::Ok().json(CheckoutResponse {
        order_id: order.order_id,
        status: order.status,
        total: order.total_price,
        payment,
    }))
}

//----------------------------------------------   Downloads  ----------------------------------------------------
/// Entitlement-gated delivery of an encrypted digital good.
///
/// The gate comes first and fails closed; only then is the catalog consulted and the vault asked to decrypt, off
/// the async executor.
#[get("/api/download/{product_id}")]
pub async fn download(
    path: web::Path<String>,
    params: web::Query<DownloadParams>,
    catalog: web::Data<CatalogApi<SqliteDatabase>>,
    entitlements: web::Data<EntitlementApi<SqliteDatabase>>,
    vault: web::Data<AssetVault>,
) -> Result<HttpResponse, ServerError> {
    let id = ProductId::from(path.into_inner());
    if !entitlements.is_entitled(&params.buyer, &id).await {
        warn!("🔒️ Download of {id} denied for '{}'", params.buyer);
        return Err(ServerError::InsufficientPermissions(
            "No settled order for this buyer covers this download".to_string(),
        ));
    }
    let product =
        catalog.product_any(&id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("No product '{id}'")))?;
    let handle = product
        .asset_handle
        .ok_or_else(|| ServerError::NoRecordFound(format!("No downloadable file for '{id}'")))?;
    let vault = vault.get_ref().clone();
    let payload =
        web::block(move || vault.retrieve(&handle)).await.map_err(|e| ServerError::Unspecified(e.to_string()))??;
    debug!("📥️ Serving {} bytes of {id} to '{}'", payload.len(), params.buyer);
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(("Content-Disposition", format!("attachment; filename=\"{id}.pdf\"")))
        .body(payload))
}

//----------------------------------------------   Card webhook  ----------------------------------------------------
/// Signed webhook from the card processor. The signature is over the raw body, so this handler takes `Bytes`, not
/// deserialized JSON; a missing or invalid signature is 401 before any order state is read.
#[post("/payments/card/webhook")]
pub async fn card_webhook(
    req: HttpRequest,
    body: web::Bytes,
    orders: web::Data<OrderLedgerApi<SqliteDatabase>>,
    adapters: web::Data<PaymentAdapters>,
) -> Result<HttpResponse, ServerError> {
    let signature = req
        .headers()
        .get("X-Flame-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::Unauthorized("Missing X-Flame-Signature header".to_string()))?;
    let confirmation = match adapters.card().handle_confirmation(&body, signature) {
        Ok(Some(c)) => c,
        Ok(None) => return Ok(HttpResponse::Ok().json(JsonResponse::success("Event acknowledged"))),
        Err(PaymentError::SignatureInvalid) => {
            warn!("💳️🚨️ Rejected a card webhook with an invalid signature");
            return Err(ServerError::Unauthorized("Invalid webhook signature".to_string()));
        },
        Err(e) => {
            warn!("💳️ Discarding unusable card webhook: {e}");
            return Ok(HttpResponse::Ok().json(JsonResponse::failure("Payload not understood")));
        },
    };
    apply_confirmation(&orders, confirmation).await
}

//----------------------------------------------   Mobile callback  -----------------------------------------------
/// Settlement callback from the mobile-money provider. The protocol carries no signature, so the peer address of
/// every delivery is logged and the unguessable correlation token does the gating.
#[post("/payments/mobile/callback")]
pub async fn mobile_callback(
    req: HttpRequest,
    body: web::Bytes,
    orders: web::Data<OrderLedgerApi<SqliteDatabase>>,
    adapters: web::Data<PaymentAdapters>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let peer = client_addr(&req, **options).map(|ip| ip.to_string()).unwrap_or_else(|| "<unknown>".to_string());
    info!("📱️ Mobile money callback from {peer}");
    let confirmation = match adapters.mobile_money().handle_confirmation(&body) {
        Ok(c) => c,
        Err(e) => {
            warn!("📱️ Discarding unusable mobile callback from {peer}: {e}");
            return Ok(HttpResponse::Ok().json(JsonResponse::failure("Payload not understood")));
        },
    };
    apply_confirmation(&orders, confirmation).await
}

/// Feeds a normalized provider confirmation into the ledger and renders the acknowledgment.
///
/// Duplicates and unknown references are acknowledged, not errored: the transition (or its absence) has already
/// been decided by the ledger's compare-and-set, and there is nothing useful a provider retry could add.
async fn apply_confirmation(
    orders: &OrderLedgerApi<SqliteDatabase>,
    confirmation: PaymentConfirmation,
) -> Result<HttpResponse, ServerError> {
    let result = match confirmation.outcome {
        PaymentOutcome::Confirmed => orders.confirm_payment(&confirmation.correlation_token).await,
        PaymentOutcome::Declined => orders.fail_payment(&confirmation.correlation_token).await,
    };
    match result {
        Ok(Some(order)) => {
            Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {} is now {}", order.order_id, order.status))))
        },
        Ok(None) => Ok(HttpResponse::Ok().json(JsonResponse::success("Already processed"))),
        Err(PaymentLedgerError::UnknownOrder(_)) => {
            warn!("🧾️ Confirmation carried a correlation token we never issued. Acknowledged and dropped.");
            Ok(HttpResponse::Ok().json(JsonResponse::failure("Unknown reference")))
        },
        Err(e) => Err(e.into()),
    }
}
