//! The session cart and the snapshot seam where it becomes an immutable order artifact.
//!
//! A [`Cart`] is a plain value object. It travels in and out of request handlers (the session transport that carries
//! it is someone else's problem) and is never shared or mutated behind a global handle. At checkout it is frozen
//! exactly once by [`Cart::snapshot`], which re-resolves every entry against the live catalog and copies the current
//! price and name into [`LineItem`]s. After that the catalog is never consulted for this order again.

use serde::{Deserialize, Serialize};
use storefront_common::Cents;

use crate::{
    db_types::{LineItem, Product, ProductCategory, ProductId},
    traits::{CatalogError, CatalogManagement},
};

/// Hard ceiling on the quantity of any single physical line. Client-supplied quantities pass through the cart
/// unvalidated otherwise, and `unit_price * quantity` must stay well inside `i64` for any storable price.
pub const MAX_LINE_QUANTITY: i64 = 1_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

/// One cart row. Name, price, and category are denormalized display data only; the snapshot re-reads them from the
/// catalog and these copies are never trusted for money math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Cents,
    pub quantity: i64,
    pub category: ProductCategory,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Adds a product to the cart, merging quantities if it is already present. Digital goods are capped at a
    /// quantity of one no matter how many times they are added, and physical goods at [`MAX_LINE_QUANTITY`].
    pub fn add(&mut self, product: &Product, quantity: i64) {
        // Bound the incoming value first so the merge below cannot overflow.
        let quantity = quantity.clamp(1, MAX_LINE_QUANTITY);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.product_id == product.id) {
            entry.quantity = clamp_quantity(entry.category, entry.quantity + quantity);
            return;
        }
        self.entries.push(CartEntry {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: clamp_quantity(product.category, quantity),
            category: product.category,
        });
    }

    /// Sets the quantity for a product already in the cart. A quantity of zero removes the entry. Attempts to push a
    /// digital good above one are clamped, not rejected.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        if let Some(entry) = self.entries.iter_mut().find(|e| &e.product_id == product_id) {
            entry.quantity = clamp_quantity(entry.category, quantity);
        }
    }

    pub fn remove(&mut self, product_id: &ProductId) {
        self.entries.retain(|e| &e.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// A display-only estimate from the denormalized prices. The authoritative total is computed from the snapshot.
    pub fn estimated_total(&self) -> Cents {
        self.entries.iter().map(|e| e.unit_price * e.quantity).sum()
    }

    /// Freezes the cart into order line items against the live catalog.
    ///
    /// Each entry must still resolve to an *active* product; a stale reference fails the whole snapshot with
    /// [`CatalogError::ProductNotFound`] so the caller can prompt a cart cleanup. Prices and names come from the
    /// catalog read, not from the cart's display copies, and digital quantities are pinned to one.
    pub async fn snapshot<B: CatalogManagement>(&self, catalog: &B) -> Result<Vec<LineItem>, CatalogError> {
        let mut items = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let product = catalog
                .find_active_product(&entry.product_id)
                .await?
                .ok_or_else(|| CatalogError::ProductNotFound(entry.product_id.clone()))?;
            items.push(LineItem {
                product_id: product.id,
                name: product.name,
                unit_price: product.price,
                quantity: clamp_quantity(product.category, entry.quantity),
                category: product.category,
            });
        }
        Ok(items)
    }
}

fn clamp_quantity(category: ProductCategory, quantity: i64) -> i64 {
    if category.is_digital() {
        1
    } else {
        quantity.clamp(1, MAX_LINE_QUANTITY)
    }
}
