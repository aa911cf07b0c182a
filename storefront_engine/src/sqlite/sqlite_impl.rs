//! `SqliteDatabase` is the concrete storage backend for the storefront engine. It implements the
//! [`PaymentLedgerDatabase`] and [`CatalogManagement`] traits on top of a sqlx connection pool.
use std::fmt::Debug;

use sqlx::SqlitePool;

use super::db::{new_pool, orders, products};
use crate::{
    db_types::{LineItem, NewOrder, NewProduct, Order, OrderId, OrderStatusType, Product, ProductId},
    helpers::{new_correlation_token, new_order_id},
    traits::{CatalogError, CatalogManagement, PaymentLedgerDatabase, PaymentLedgerError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database at `FLAME_DATABASE_URL` (or the default path).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = super::db::db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl PaymentLedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder, items: &[LineItem]) -> Result<Order, PaymentLedgerError> {
        let order_id = OrderId::from(new_order_id());
        let token = new_correlation_token();
        let total: i64 = items.iter().map(|i| i.subtotal().value()).sum();
        let mut tx = self.pool.begin().await?;
        let inserted = orders::insert_order(&order, &order_id, &token, total, &mut tx).await?;
        orders::insert_line_items(&order_id, items, &mut tx).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentLedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_order_id(order_id, &mut conn).await?)
    }

    async fn fetch_order_by_token(&self, token: &str) -> Result<Option<Order>, PaymentLedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_token(token, &mut conn).await?)
    }

    async fn fetch_line_items(&self, order_id: &OrderId) -> Result<Vec<LineItem>, PaymentLedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_line_items(order_id, &mut conn).await?)
    }

    async fn update_status_if(
        &self,
        order_id: &OrderId,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, PaymentLedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_status_if(order_id, expected, new_status, &mut conn).await
    }

    async fn fetch_orders_newest_first(&self) -> Result<Vec<Order>, PaymentLedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_newest_first(&mut conn).await?)
    }

    async fn delete_all_orders(&self) -> Result<u64, PaymentLedgerError> {
        let mut tx = self.pool.begin().await?;
        let n = orders::delete_all_orders(&mut tx).await?;
        tx.commit().await?;
        Ok(n)
    }

    async fn settled_order_exists(&self, email: &str, product_id: &str) -> Result<bool, PaymentLedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::settled_order_exists(email, product_id, &mut conn).await?)
    }

    async fn close(&mut self) -> Result<(), PaymentLedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn find_active_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_product(id, true, &mut conn).await?)
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_product(id, false, &mut conn).await?)
    }

    async fn upsert_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::upsert_product(&product, &mut conn).await
    }

    async fn list_products(&self, include_inactive: bool) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::list_products(include_inactive, &mut conn).await?)
    }

    async fn deactivate_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::deactivate_product(id, &mut conn).await
    }

    async fn set_product_asset(
        &self,
        id: &ProductId,
        asset_handle: &str,
        preview: Option<&str>,
    ) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::set_product_asset(id, asset_handle, preview, &mut conn).await
    }
}
