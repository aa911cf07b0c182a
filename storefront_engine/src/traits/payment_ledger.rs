use thiserror::Error;

use crate::db_types::{LineItem, NewOrder, Order, OrderId, OrderStatusType};

/// Backend contract for the order ledger.
///
/// Every status transition goes through [`Self::update_status_if`], a compare-and-set on the current status. The
/// affected-row count of that statement is the sole deduplication mechanism for retried or racing confirmation
/// deliveries; there is no separate dedup store.
#[allow(async_fn_in_trait)]
pub trait PaymentLedgerDatabase: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Stores the order and its line-item snapshot in one atomic transaction. The caller has already validated the
    /// buyer fields and computed the total.
    async fn insert_order(&self, order: NewOrder, items: &[LineItem]) -> Result<Order, PaymentLedgerError>;

    /// Fetches an order by its public id.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentLedgerError>;

    /// Fetches an order by the correlation token issued to a payment provider. Confirmation paths must resolve
    /// orders this way and never trust an order id embedded in the event payload.
    async fn fetch_order_by_token(&self, token: &str) -> Result<Option<Order>, PaymentLedgerError>;

    /// Returns the frozen line items for an order, in insertion order.
    async fn fetch_line_items(&self, order_id: &OrderId) -> Result<Vec<LineItem>, PaymentLedgerError>;

    /// Compare-and-set status transition. Returns the updated order if the order existed *and* its status was
    /// `expected` at the moment of the update, `None` otherwise.
    async fn update_status_if(
        &self,
        order_id: &OrderId,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, PaymentLedgerError>;

    /// All orders, newest first.
    async fn fetch_orders_newest_first(&self) -> Result<Vec<Order>, PaymentLedgerError>;

    /// Deletes every order and line item. Returns the number of orders removed.
    async fn delete_all_orders(&self) -> Result<u64, PaymentLedgerError>;

    /// True iff a settled (`Paid` or `Fulfilled`) order for the given buyer email contains the product.
    async fn settled_order_exists(&self, email: &str, product_id: &str) -> Result<bool, PaymentLedgerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentLedgerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentLedgerError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Required buyer field '{0}' is missing")]
    ValidationError(&'static str),
    #[error("Cannot check out an empty cart")]
    EmptyCart,
    #[error("No order matches the confirmation reference '{0}'")]
    UnknownOrder(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {order_id} cannot move from {from} to {to}")]
    TransitionForbidden { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
}

impl From<sqlx::Error> for PaymentLedgerError {
    fn from(e: sqlx::Error) -> Self {
        PaymentLedgerError::DatabaseError(e.to_string())
    }
}
