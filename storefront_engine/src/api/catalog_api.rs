use crate::{
    db_types::{NewProduct, Product, ProductId},
    traits::{CatalogError, CatalogManagement},
};

/// Thin facade over the catalog backend. The storefront reads through [`Self::product`] and [`Self::storefront`]
/// (active entries only); the admin paths see everything.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        self.db.find_active_product(id).await
    }

    pub async fn product_any(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        self.db.find_product(id).await
    }

    pub async fn storefront(&self) -> Result<Vec<Product>, CatalogError> {
        self.db.list_products(false).await
    }

    pub async fn all_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.db.list_products(true).await
    }

    pub async fn upsert(&self, product: NewProduct) -> Result<Product, CatalogError> {
        self.db.upsert_product(product).await
    }

    pub async fn deactivate(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.db.deactivate_product(id).await
    }

    pub async fn attach_asset(
        &self,
        id: &ProductId,
        asset_handle: &str,
        preview: Option<&str>,
    ) -> Result<Product, CatalogError> {
        self.db.set_product_asset(id, asset_handle, preview).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
