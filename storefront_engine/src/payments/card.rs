//! The hosted card-processor path.
//!
//! `begin` hands the buyer a redirect to the processor's hosted checkout page, keyed by our correlation token.
//! Confirmation comes back on a webhook whose body is signed with HMAC-SHA256 under a shared secret. The signature
//! is verified against the *raw* bytes before the JSON is even parsed; a bad signature rejects the delivery without
//! reading any order state.

use log::debug;
use serde::Deserialize;
use storefront_common::Secret;

use crate::{
    db_types::{Order, PaymentMethod},
    helpers::{calculate_hmac, constant_time_eq},
    payments::{CheckoutAction, PaymentAdapter, PaymentConfirmation, PaymentError, PaymentOutcome},
};

/// Event types the processor sends that we act on. Everything else is acknowledged and ignored.
const EVENT_PAYMENT_SUCCEEDED: &str = "payment.succeeded";
const EVENT_PAYMENT_FAILED: &str = "payment.failed";

#[derive(Clone)]
pub struct CardAdapter {
    checkout_base_url: String,
    webhook_secret: Secret<String>,
}

#[derive(Debug, Deserialize)]
struct CardWebhookPayload {
    event: String,
    /// Our correlation token, echoed back by the processor.
    reference: String,
}

impl CardAdapter {
    pub fn new(checkout_base_url: String, webhook_secret: Secret<String>) -> Self {
        Self { checkout_base_url, webhook_secret }
    }

    /// Verifies and normalizes a webhook delivery.
    ///
    /// Returns `Ok(None)` for authentic events we do not care about (refund notices, disputes and so on), so the
    /// caller can acknowledge them without touching the ledger.
    pub fn handle_confirmation(
        &self,
        raw_body: &[u8],
        signature: &str,
    ) -> Result<Option<PaymentConfirmation>, PaymentError> {
        let expected = calculate_hmac(self.webhook_secret.reveal(), raw_body);
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(PaymentError::SignatureInvalid);
        }
        let payload: CardWebhookPayload =
            serde_json::from_slice(raw_body).map_err(|e| PaymentError::MalformedPayload(e.to_string()))?;
        let outcome = match payload.event.as_str() {
            EVENT_PAYMENT_SUCCEEDED => PaymentOutcome::Confirmed,
            EVENT_PAYMENT_FAILED => PaymentOutcome::Declined,
            other => {
                debug!("💳️ Ignoring card processor event '{other}'");
                return Ok(None);
            },
        };
        Ok(Some(PaymentConfirmation { correlation_token: payload.reference, outcome }))
    }
}

impl PaymentAdapter for CardAdapter {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Card
    }

    fn begin(&self, order: &Order) -> Result<CheckoutAction, PaymentError> {
        if self.checkout_base_url.is_empty() {
            return Err(PaymentError::BeginFailed("Card processor is not configured".to_string()));
        }
        let url = format!("{}/session/{}", self.checkout_base_url.trim_end_matches('/'), order.correlation_token);
        debug!("💳️ Card checkout session prepared for order {}", order.order_id);
        Ok(CheckoutAction::RedirectToProcessor { url })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn adapter() -> CardAdapter {
        CardAdapter::new("https://pay.example.com".to_string(), Secret::new("whsec_test".to_string()))
    }

    fn signed(body: &str) -> String {
        calculate_hmac("whsec_test", body.as_bytes())
    }

    #[test]
    fn valid_signature_and_success_event() {
        let body = r#"{"event":"payment.succeeded","reference":"tok123","amount":8900}"#;
        let conf = adapter().handle_confirmation(body.as_bytes(), &signed(body)).unwrap().unwrap();
        assert_eq!(conf.correlation_token, "tok123");
        assert_eq!(conf.outcome, PaymentOutcome::Confirmed);
    }

    #[test]
    fn failed_event_maps_to_declined() {
        let body = r#"{"event":"payment.failed","reference":"tok123"}"#;
        let conf = adapter().handle_confirmation(body.as_bytes(), &signed(body)).unwrap().unwrap();
        assert_eq!(conf.outcome, PaymentOutcome::Declined);
    }

    #[test]
    fn invalid_signature_is_rejected_before_parsing() {
        // Deliberately unparseable body: the signature check must fire first.
        let body = b"not json at all";
        let err = adapter().handle_confirmation(body, "bogus").unwrap_err();
        assert!(matches!(err, PaymentError::SignatureInvalid));
    }

    #[test]
    fn unknown_events_are_ignored() {
        let body = r#"{"event":"charge.refunded","reference":"tok123"}"#;
        assert!(adapter().handle_confirmation(body.as_bytes(), &signed(body)).unwrap().is_none());
    }
}
