//! Deterministic checks of the mail wiring: producers are dropped, the handlers drained, and only then are the
//! mock's expectations evaluated.

use std::sync::Arc;

use storefront_engine::{
    cart::Cart,
    db_types::{NewOrder, PaymentMethod, ProductId},
    events::EventHandlers,
    mail::{EmailMessage, NotificationError, NotificationSender},
    traits::CatalogManagement,
    OrderLedgerApi,
};

use super::helpers::setup;
use crate::server::notification_hooks;

mockall::mock! {
    Sender {}
    impl NotificationSender for Sender {
        fn send(&self, message: EmailMessage) -> Result<(), NotificationError>;
    }
}

const SHOP_EMAIL: &str = "owner@feminineflame.example";

#[actix_web::test]
async fn one_checkout_and_one_settlement_produce_three_mails() {
    let shop = setup().await;
    let mut sender = MockSender::new();
    // Order confirmation to the buyer, new-order alert to the operator, then one payment receipt.
    sender.expect_send().times(2).withf(|m| !m.subject.contains("Payment received")).returning(|_| Ok(()));
    sender.expect_send().times(1).withf(|m| m.subject.contains("Payment received")).returning(|_| Ok(()));

    let hooks = notification_hooks(Arc::new(sender), SHOP_EMAIL.to_string());
    let handlers = EventHandlers::new(8, hooks);
    let api = OrderLedgerApi::new(shop.db.clone(), handlers.producers());

    let product = shop.db.find_active_product(&ProductId::from("scent-notes")).await.unwrap().unwrap();
    let mut cart = Cart::new();
    cart.add(&product, 1);
    let items = cart.snapshot(&shop.db).await.unwrap();
    let order = NewOrder {
        customer_name: "Wanjiru Achieng".to_string(),
        phone: "+254700111222".to_string(),
        address: "4 Peponi Rd, Nairobi".to_string(),
        country: "Kenya".to_string(),
        email: Some("w@example.com".to_string()),
        payment_method: PaymentMethod::MobileMoney,
    };
    let order = api.place_order(order, items).await.unwrap();
    // Three confirmations, one transition, one receipt.
    assert!(api.confirm_payment(&order.correlation_token).await.unwrap().is_some());
    assert!(api.confirm_payment(&order.correlation_token).await.unwrap().is_none());
    assert!(api.confirm_payment(&order.correlation_token).await.unwrap().is_none());

    drop(api);
    if let Some(handler) = handlers.on_order_created {
        handler.start_handler().await;
    }
    if let Some(handler) = handlers.on_order_paid {
        handler.start_handler().await;
    }
    // MockSender verifies the call counts on drop.
}

#[actix_web::test]
async fn mail_failures_never_fail_the_order() {
    let shop = setup().await;
    let mut sender = MockSender::new();
    sender.expect_send().returning(|m| Err(NotificationError { recipient: m.recipient, reason: "SMTP down".to_string() }));

    let hooks = notification_hooks(Arc::new(sender), SHOP_EMAIL.to_string());
    let handlers = EventHandlers::new(8, hooks);
    let api = OrderLedgerApi::new(shop.db.clone(), handlers.producers());

    let product = shop.db.find_active_product(&ProductId::from("velvet-bloom")).await.unwrap().unwrap();
    let mut cart = Cart::new();
    cart.add(&product, 1);
    let items = cart.snapshot(&shop.db).await.unwrap();
    let order = NewOrder {
        customer_name: "Wanjiru Achieng".to_string(),
        phone: "+254700111222".to_string(),
        address: "4 Peponi Rd, Nairobi".to_string(),
        country: "Kenya".to_string(),
        email: Some("w@example.com".to_string()),
        payment_method: PaymentMethod::MobileMoney,
    };
    let order = api.place_order(order, items).await.unwrap();
    let paid = api.confirm_payment(&order.correlation_token).await.unwrap();
    assert!(paid.is_some());

    drop(api);
    if let Some(handler) = handlers.on_order_created {
        handler.start_handler().await;
    }
    if let Some(handler) = handlers.on_order_paid {
        handler.start_handler().await;
    }
}
