//! Server assembly: database, vault, event plumbing, app data, and the route tree.
//!
//! [`create_server_instance`] is split from [`run_server`] and the app wiring lives in [`configure_api`] so that
//! endpoint tests can stand up the exact production route tree against a throwaway database.

use std::{sync::Arc, time::Duration};

use actix_web::{
    dev::{Server, Service},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use futures::{future::ok, FutureExt};
use log::*;
use storefront_common::Secret;
use storefront_engine::{
    events::{EventHandlers, EventHooks, EventProducers, OrderCreatedEvent, OrderPaidEvent},
    helpers::constant_time_eq,
    mail::{self, LogSender, NotificationSender},
    payments::{CardAdapter, ManualAdapter, MobileMoneyAdapter, PaymentAdapters},
    vault::AssetVault,
    CatalogApi,
    EntitlementApi,
    OrderLedgerApi,
    SqliteDatabase,
};

use crate::{
    admin_routes,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    routes,
};

const EVENT_BUFFER_SIZE: usize = 32;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let sender: Arc<dyn NotificationSender> = Arc::new(LogSender);
    let srv = create_server_instance(config, db, sender)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    sender: Arc<dyn NotificationSender>,
) -> Result<Server, ServerError> {
    let vault =
        AssetVault::new(&config.vault_key, config.vault_dir.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, notification_hooks(sender, config.shop_email.clone()));
    let producers = handlers.producers();
    tokio::spawn(handlers.start_handlers());
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("flame::access_log"))
            .configure(configure_api(&config, db.clone(), producers.clone(), vault.clone()))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

/// Registers every app-data object and route the server exposes. Shared between production and endpoint tests.
pub fn configure_api(
    config: &ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    vault: AssetVault,
) -> impl FnOnce(&mut web::ServiceConfig) {
    let orders_api = OrderLedgerApi::new(db.clone(), producers);
    let catalog_api = CatalogApi::new(db.clone());
    let entitlements_api = EntitlementApi::new(db);
    let adapters = PaymentAdapters::new(
        CardAdapter::new(config.checkout_base_url.clone(), config.card_webhook_secret.clone()),
        MobileMoneyAdapter::new(config.mobile_shortcode.clone()),
        ManualAdapter::new(config.shop_email.clone()),
    );
    let options = ServerOptions::from_config(config);
    let admin_token = config.admin_token.clone();
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(entitlements_api))
            .app_data(web::Data::new(adapters))
            .app_data(web::Data::new(vault))
            .app_data(web::Data::new(options))
            .service(routes::health)
            .service(routes::storefront_products)
            .service(routes::product_detail)
            .service(routes::checkout)
            .service(routes::download)
            .service(routes::card_webhook)
            .service(routes::mobile_callback)
            .service(admin_scope(admin_token));
    }
}

/// The `/admin` scope, gated by a constant-time comparison of the `X-Admin-Token` header against the configured
/// secret. An empty configured token matches nothing, which is how admin access is disabled outright.
fn admin_scope(token: Secret<String>) -> impl actix_web::dev::HttpServiceFactory {
    web::scope("/admin")
        .wrap_fn(move |req, srv| {
            let provided = req.headers().get("X-Admin-Token").and_then(|v| v.to_str().ok()).unwrap_or_default();
            let expected = token.reveal();
            if !expected.is_empty() && constant_time_eq(expected.as_bytes(), provided.as_bytes()) {
                srv.call(req).boxed_local()
            } else {
                warn!("🔐️ Rejected admin request for {} (bad or missing X-Admin-Token)", req.path());
                let response =
                    req.error_response(ServerError::InsufficientPermissions("Admin token invalid or missing".to_string()));
                ok(response).boxed_local()
            }
        })
        .service(admin_routes::admin_products)
        .service(admin_routes::upsert_product)
        .service(admin_routes::deactivate_product)
        .service(admin_routes::upload_asset)
        .service(admin_routes::admin_orders)
        .service(admin_routes::fulfill_order)
        .service(admin_routes::purge_orders)
}

/// Wires the order lifecycle events to outbound mail. Every send is best-effort: a failed or slow delivery is
/// logged and the order proceeds regardless.
pub fn notification_hooks(sender: Arc<dyn NotificationSender>, shop_email: String) -> EventHooks {
    let mut hooks = EventHooks::default();
    let on_created = sender.clone();
    hooks.on_order_created(move |event: OrderCreatedEvent| {
        let sender = on_created.clone();
        let admin_address = shop_email.clone();
        Box::pin(async move {
            if let Some(message) = mail::order_confirmation(&event.order, &event.items) {
                if let Err(e) = sender.send(message) {
                    warn!("✉️ Could not send order confirmation for {}: {e}", event.order.order_id);
                }
            }
            let alert = mail::admin_new_order(&event.order, &event.items, &admin_address);
            if let Err(e) = sender.send(alert) {
                warn!("✉️ Could not send new-order alert for {}: {e}", event.order.order_id);
            }
        })
    });
    hooks.on_order_paid(move |event: OrderPaidEvent| {
        let sender = sender.clone();
        Box::pin(async move {
            if let Some(message) = mail::payment_received(&event.order) {
                if let Err(e) = sender.send(message) {
                    warn!("✉️ Could not send payment receipt for {}: {e}", event.order.order_id);
                }
            }
        })
    });
    hooks
}
