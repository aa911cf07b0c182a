//! The three payment paths and the pure country → payment-method mapping.
//!
//! Confirmation events arrive from independent, untrusted, asynchronously delivered sources. Nothing in this module
//! touches the order ledger: adapters normalize provider-specific payloads into a [`PaymentConfirmation`] and the
//! caller decides what to do with it. That keeps "acknowledge the provider" and "apply a ledger transition" as two
//! separate concerns.

mod card;
mod manual;
mod mobile_money;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use card::CardAdapter;
pub use manual::ManualAdapter;
pub use mobile_money::MobileMoneyAdapter;

use crate::db_types::{Order, PaymentMethod};

/// Countries where the push-payment mobile-money flow is available.
const MOBILE_MONEY_COUNTRIES: [&str; 4] = ["kenya", "tanzania", "uganda", "rwanda"];

/// Countries routed to the hosted card processor.
const CARD_COUNTRIES: [&str; 12] = [
    "uk",
    "united kingdom",
    "us",
    "usa",
    "united states",
    "canada",
    "germany",
    "france",
    "netherlands",
    "spain",
    "italy",
    "ireland",
];

/// Deterministically selects the payment path for a buyer country. This is a business rule, not a preference:
/// unmapped countries fall through to manual settlement instructions.
pub fn method_for_country(country: &str) -> PaymentMethod {
    let c = country.trim().to_lowercase();
    if MOBILE_MONEY_COUNTRIES.contains(&c.as_str()) {
        PaymentMethod::MobileMoney
    } else if CARD_COUNTRIES.contains(&c.as_str()) {
        PaymentMethod::Card
    } else {
        PaymentMethod::Manual
    }
}

/// What the buyer should do next, as returned by [`PaymentAdapter::begin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckoutAction {
    /// Send the buyer to the card processor's hosted page.
    RedirectToProcessor { url: String },
    /// A payment prompt has been pushed to the buyer's handset. Settlement is confirmed later via callback.
    PushPromptSent { prompt: String },
    /// No automated settlement exists; show these instructions and wait for an operator to fulfil the order.
    SettlementInstructions { instructions: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Confirmed,
    Declined,
}

/// A provider confirmation normalized down to the two things the ledger needs: which order (by correlation token,
/// never by a provider-embedded order id) and whether the money arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub correlation_token: String,
    pub outcome: PaymentOutcome,
}

#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    /// The webhook signature did not verify. The payload must be discarded before any state is read.
    #[error("Webhook signature is invalid")]
    SignatureInvalid,
    #[error("Could not parse confirmation payload: {0}")]
    MalformedPayload(String),
    /// `begin()` could not reach or prepare the provider. Surfaced to the buyer as retryable.
    #[error("Could not initiate payment: {0}")]
    BeginFailed(String),
}

/// The capability every payment path offers at checkout time. Confirmation handling is deliberately *not* part of
/// this trait: each provider has its own inbound endpoint and payload shape, so `handle_confirmation` lives on the
/// concrete adapters, and the manual path has none at all.
pub trait PaymentAdapter: Send + Sync {
    fn method(&self) -> PaymentMethod;

    fn begin(&self, order: &Order) -> Result<CheckoutAction, PaymentError>;
}

/// The full adapter set, constructed once at startup. Routing by [`PaymentMethod`] happens here so that adding a
/// fourth provider never touches the existing variants.
pub struct PaymentAdapters {
    card: CardAdapter,
    mobile_money: MobileMoneyAdapter,
    manual: ManualAdapter,
}

impl PaymentAdapters {
    pub fn new(card: CardAdapter, mobile_money: MobileMoneyAdapter, manual: ManualAdapter) -> Self {
        Self { card, mobile_money, manual }
    }

    pub fn for_method(&self, method: PaymentMethod) -> &dyn PaymentAdapter {
        match method {
            PaymentMethod::Card => &self.card,
            PaymentMethod::MobileMoney => &self.mobile_money,
            PaymentMethod::Manual => &self.manual,
        }
    }

    pub fn card(&self) -> &CardAdapter {
        &self.card
    }

    pub fn mobile_money(&self) -> &MobileMoneyAdapter {
        &self.mobile_money
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn country_mapping_is_closed_and_case_insensitive() {
        assert_eq!(method_for_country("Kenya"), PaymentMethod::MobileMoney);
        assert_eq!(method_for_country(" UGANDA "), PaymentMethod::MobileMoney);
        assert_eq!(method_for_country("UK"), PaymentMethod::Card);
        assert_eq!(method_for_country("United States"), PaymentMethod::Card);
        assert_eq!(method_for_country("Mongolia"), PaymentMethod::Manual);
        assert_eq!(method_for_country(""), PaymentMethod::Manual);
    }
}
