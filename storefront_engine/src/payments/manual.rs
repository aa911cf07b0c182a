//! The manual/contact settlement path for countries with no automated provider.
//!
//! There is no confirmation channel here at all. The order rests in `Pending` until an operator verifies receipt
//! out-of-band and marks it fulfilled through the admin API.

use crate::{
    db_types::{Order, PaymentMethod},
    payments::{CheckoutAction, PaymentAdapter, PaymentError},
};

#[derive(Clone)]
pub struct ManualAdapter {
    contact: String,
}

impl ManualAdapter {
    pub fn new(contact: String) -> Self {
        Self { contact }
    }
}

impl PaymentAdapter for ManualAdapter {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Manual
    }

    fn begin(&self, order: &Order) -> Result<CheckoutAction, PaymentError> {
        let instructions = format!(
            "Thank you for your order {}. To complete your purchase of {}, please contact {} to arrange payment. \
             Quote your order number in all correspondence.",
            order.order_id, order.total_price, self.contact
        );
        Ok(CheckoutAction::SettlementInstructions { instructions })
    }
}
