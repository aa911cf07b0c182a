use thiserror::Error;

use crate::db_types::{NewProduct, Product, ProductId};

/// Backend contract for the product catalog.
///
/// The catalog is read concurrently by storefront requests and mutated only by admin writes. Readers must tolerate a
/// product disappearing or being deactivated between cart-add time and checkout; that surfaces as
/// [`CatalogError::ProductNotFound`] at the snapshot seam, never as a crash.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement: Clone {
    /// Fetches a product only if it exists and is active. This is the storefront/checkout path.
    async fn find_active_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;

    /// Fetches a product regardless of its active flag. Admin path.
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;

    /// Inserts the product, or replaces every mutable field if the id already exists.
    async fn upsert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;

    /// Lists products, optionally including inactive ones.
    async fn list_products(&self, include_inactive: bool) -> Result<Vec<Product>, CatalogError>;

    /// Soft delete. Historical line items keep their snapshot, so nothing is ever hard-deleted from the catalog.
    async fn deactivate_product(&self, id: &ProductId) -> Result<Product, CatalogError>;

    /// Records the vault handle (and optional preview excerpt) of an uploaded ebook payload.
    async fn set_product_asset(
        &self,
        id: &ProductId,
        asset_handle: &str,
        preview: Option<&str>,
    ) -> Result<Product, CatalogError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Product '{0}' does not exist or is no longer available")]
    ProductNotFound(ProductId),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}
