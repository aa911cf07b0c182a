use log::warn;

use crate::{
    db_types::ProductId,
    traits::PaymentLedgerDatabase,
};

/// Entitlement is a derived fact, not a stored one: a buyer may download a digital good iff they hold a settled
/// order containing it. Computed on demand against the ledger; purging orders purges entitlements.
pub struct EntitlementApi<B> {
    db: B,
}

impl<B> EntitlementApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> EntitlementApi<B>
where B: PaymentLedgerDatabase
{
    /// True iff `buyer_email` has an order in `Paid` or `Fulfilled` containing `product_id`. Manual-settlement
    /// orders count only once fulfilled, because they are never `Paid`.
    ///
    /// Safe on any input: an anonymous or garbage identity yields `false`, and backend failures are logged and
    /// reported as "not entitled" rather than surfaced — this sits directly on the download path.
    pub async fn is_entitled(&self, buyer_email: &str, product_id: &ProductId) -> bool {
        let email = buyer_email.trim();
        if email.is_empty() {
            return false;
        }
        match self.db.settled_order_exists(email, product_id.as_str()).await {
            Ok(entitled) => entitled,
            Err(e) => {
                warn!("🔒️ Entitlement check failed for product {product_id}: {e}. Denying access.");
                false
            },
        }
    }
}
