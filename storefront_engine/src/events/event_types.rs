use crate::db_types::{LineItem, Order};

/// Fired exactly once per successful checkout, after the order row and its snapshot are committed.
#[derive(Debug, Clone)]
pub struct OrderCreatedEvent {
    pub order: Order,
    pub items: Vec<LineItem>,
}

impl OrderCreatedEvent {
    pub fn new(order: Order, items: Vec<LineItem>) -> Self {
        Self { order, items }
    }
}

/// Fired exactly once per order, on the single Pending→Paid transition. Duplicate confirmation deliveries lose the
/// compare-and-set and never reach this event.
#[derive(Debug, Clone)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
