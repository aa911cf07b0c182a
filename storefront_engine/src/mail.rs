//! Outbound notification content and the seam to whatever actually delivers it.
//!
//! The engine owns *what* gets said (plain-text templates rendered from order data) but not *how* it is sent. The
//! [`NotificationSender`] trait is the delivery seam; the default [`LogSender`] just logs, which is also the
//! recommended behaviour when no SMTP relay is configured. Every send is best-effort: callers log failures and move
//! on, because an order must outlive its emails.

use std::fmt::Write as _;

use log::info;
use thiserror::Error;

use crate::db_types::{LineItem, Order, PaymentMethod};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Error)]
#[error("Could not deliver notification to {recipient}: {reason}")]
pub struct NotificationError {
    pub recipient: String,
    pub reason: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait NotificationSender: Send + Sync {
    fn send(&self, message: EmailMessage) -> Result<(), NotificationError>;
}

/// Delivery stand-in that writes the rendered mail to the log.
#[derive(Debug, Clone, Default)]
pub struct LogSender;

impl NotificationSender for LogSender {
    fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        info!("✉️ [to: {}] {} -- {}", message.recipient, message.subject, message.body.replace('\n', " / "));
        Ok(())
    }
}

fn item_lines(items: &[LineItem]) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "  {} x{} @ {} = {}", item.name, item.quantity, item.unit_price, item.subtotal());
    }
    out
}

/// Buyer-facing confirmation, rendered at checkout. Only sent when the buyer left an email address.
pub fn order_confirmation(order: &Order, items: &[LineItem]) -> Option<EmailMessage> {
    let recipient = order.email.clone()?;
    let mut body = format!(
        "Hi {},\n\nThank you for your order {}.\n\n{}\nTotal: {}\n\n",
        order.customer_name,
        order.order_id,
        item_lines(items),
        order.total_price
    );
    match order.payment_method {
        PaymentMethod::Manual => {
            body.push_str("We will contact you shortly to arrange payment and delivery.\n");
        },
        _ => body.push_str("We will confirm your payment shortly.\n"),
    }
    Some(EmailMessage { recipient, subject: format!("Your Feminine Flame order {}", order.order_id), body })
}

/// Operator alert for every new order, regardless of payment path.
pub fn admin_new_order(order: &Order, items: &[LineItem], admin_address: &str) -> EmailMessage {
    let body = format!(
        "New order {} from {} ({}, {}).\nPayment path: {}\n\n{}\nTotal: {}\nShip to: {}",
        order.order_id,
        order.customer_name,
        order.phone,
        order.country,
        order.payment_method,
        item_lines(items),
        order.total_price,
        order.address
    );
    EmailMessage {
        recipient: admin_address.to_string(),
        subject: format!("[shop] New order {} ({})", order.order_id, order.total_price),
        body,
    }
}

/// Buyer-facing payment receipt, rendered on the single Pending→Paid transition.
pub fn payment_received(order: &Order) -> Option<EmailMessage> {
    let recipient = order.email.clone()?;
    let body = format!(
        "Hi {},\n\nWe have received your payment of {} for order {}. Your goods are on their way; any ebooks in \
         your order are available for download now.\n",
        order.customer_name, order.total_price, order.order_id
    );
    Some(EmailMessage { recipient, subject: format!("Payment received for order {}", order.order_id), body })
}
