use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{LineItem, NewOrder, Order, OrderId, OrderStatusType, PaymentMethod},
    events::{EventProducers, OrderCreatedEvent, OrderPaidEvent},
    traits::{PaymentLedgerDatabase, PaymentLedgerError},
};

/// `OrderLedgerApi` owns order records and their status transitions. It is the only component that writes to the
/// ledger; payment adapters and HTTP handlers feed normalized events into it.
///
/// The transition graph:
///
/// | From \ To | Paid | Fulfilled | Failed |
/// |-----------|------|-----------|--------|
/// | Pending   | 1    | 2 (manual only) | ok |
/// | Paid      | no-op | ok       | no-op  |
/// | Fulfilled | no-op | Err      | no-op  |
/// | Failed    | no-op | Err      | no-op  |
///
/// ### (1) `Pending` → `Paid`
/// Applied by [`Self::confirm_payment`], resolved from a provider correlation token. Confirmations can arrive
/// duplicated, concurrently, or long after the fact, so the transition is a compare-and-set and every side effect
/// (the order-paid event, and through it the receipt email and entitlement visibility) hangs off the single winning
/// update. Losers are silent no-ops.
///
/// ### (2) `Pending` → `Fulfilled`
/// Only valid for manual-settlement orders, and only via [`Self::mark_fulfilled`], which represents an operator
/// confirming out-of-band receipt. Manual orders never pass through `Paid`.
pub struct OrderLedgerApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderLedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderLedgerApi")
    }
}

impl<B> OrderLedgerApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderLedgerApi<B>
where B: PaymentLedgerDatabase
{
    /// Creates a new `Pending` order from validated buyer details and an already-frozen cart snapshot.
    ///
    /// The total is computed from the snapshot here, once; nothing ever recomputes it. Fires the order-created
    /// event (notification fan-out) after the commit.
    pub async fn place_order(&self, order: NewOrder, items: Vec<LineItem>) -> Result<Order, PaymentLedgerError> {
        if let Some(field) = order.first_blank_field() {
            return Err(PaymentLedgerError::ValidationError(field));
        }
        if items.is_empty() {
            return Err(PaymentLedgerError::EmptyCart);
        }
        let order = self.db.insert_order(order, &items).await?;
        debug!("🧾️ Order {} created ({}, {})", order.order_id, order.payment_method, order.total_price);
        for emitter in &self.producers.order_created_producer {
            emitter.publish_event(OrderCreatedEvent::new(order.clone(), items.clone())).await;
        }
        Ok(order)
    }

    /// Applies a provider's successful confirmation: `Pending` → `Paid`, resolved **by correlation token**.
    ///
    /// Idempotent. Returns the updated order when this call performed the transition, and `None` when the order had
    /// already left `Pending` (duplicate delivery, lost race, or a late event for a failed order). Only the winning
    /// call fires the order-paid event, so entitlements are granted and receipts sent at most once. An unknown token
    /// is an error: the provider is echoing a reference we never issued.
    pub async fn confirm_payment(&self, token: &str) -> Result<Option<Order>, PaymentLedgerError> {
        let order = self
            .db
            .fetch_order_by_token(token)
            .await?
            .ok_or_else(|| PaymentLedgerError::UnknownOrder(token.to_string()))?;
        match self.db.update_status_if(&order.order_id, OrderStatusType::Pending, OrderStatusType::Paid).await? {
            Some(paid) => {
                info!("🧾️✅️ Order {} is paid ({})", paid.order_id, paid.total_price);
                for emitter in &self.producers.order_paid_producer {
                    emitter.publish_event(OrderPaidEvent::new(paid.clone())).await;
                }
                Ok(Some(paid))
            },
            None => {
                debug!("🧾️ Duplicate or late confirmation for order {} (status {}). Ignored.", order.order_id, order.status);
                Ok(None)
            },
        }
    }

    /// Applies a provider's declined/failed confirmation: `Pending` → `Failed`. No-op on any other state.
    pub async fn fail_payment(&self, token: &str) -> Result<Option<Order>, PaymentLedgerError> {
        let order = self
            .db
            .fetch_order_by_token(token)
            .await?
            .ok_or_else(|| PaymentLedgerError::UnknownOrder(token.to_string()))?;
        let failed =
            self.db.update_status_if(&order.order_id, OrderStatusType::Pending, OrderStatusType::Failed).await?;
        if let Some(o) = &failed {
            info!("🧾️❌️ Order {} marked as failed", o.order_id);
        }
        Ok(failed)
    }

    /// Operator-only transition to `Fulfilled`. Card and mobile-money orders must be `Paid` first; manual orders go
    /// straight from `Pending`, which is how out-of-band settlement is recorded at all.
    pub async fn mark_fulfilled(&self, order_id: &OrderId) -> Result<Order, PaymentLedgerError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| PaymentLedgerError::OrderNotFound(order_id.clone()))?;
        let expected = match (order.status, order.payment_method) {
            (OrderStatusType::Paid, _) => OrderStatusType::Paid,
            (OrderStatusType::Pending, PaymentMethod::Manual) => OrderStatusType::Pending,
            (from, _) => {
                return Err(PaymentLedgerError::TransitionForbidden {
                    order_id: order_id.clone(),
                    from,
                    to: OrderStatusType::Fulfilled,
                })
            },
        };
        match self.db.update_status_if(order_id, expected, OrderStatusType::Fulfilled).await? {
            Some(fulfilled) => {
                info!("🧾️📦️ Order {} fulfilled", fulfilled.order_id);
                Ok(fulfilled)
            },
            // A confirmation or a second admin raced us between the fetch and the update.
            None => Err(PaymentLedgerError::TransitionForbidden {
                order_id: order_id.clone(),
                from: order.status,
                to: OrderStatusType::Fulfilled,
            }),
        }
    }

    /// Deletes every order. This is the documented, deliberately destructive bulk purge; all entitlements vanish
    /// with the orders. Admin surface only.
    pub async fn purge_all(&self) -> Result<u64, PaymentLedgerError> {
        let n = self.db.delete_all_orders().await?;
        warn!("🧾️🗑️ Purged {n} orders from the ledger");
        Ok(n)
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentLedgerError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    pub async fn fetch_line_items(&self, order_id: &OrderId) -> Result<Vec<LineItem>, PaymentLedgerError> {
        self.db.fetch_line_items(order_id).await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, PaymentLedgerError> {
        self.db.fetch_orders_newest_first().await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
