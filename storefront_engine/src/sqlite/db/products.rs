use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, Product, ProductId},
    traits::CatalogError,
};

pub async fn fetch_product(
    id: &ProductId,
    active_only: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let sql = if active_only {
        "SELECT * FROM products WHERE id = $1 AND active = 1"
    } else {
        "SELECT * FROM products WHERE id = $1"
    };
    let product = sqlx::query_as(sql).bind(id.as_str()).fetch_optional(conn).await?;
    Ok(product)
}

/// Upsert keyed on the product id. The active flag is reset to true on every upsert; deactivation is a separate,
/// deliberate call. Vault handles are not touched here.
pub async fn upsert_product(product: &NewProduct, conn: &mut SqliteConnection) -> Result<Product, CatalogError> {
    let row = sqlx::query_as(
        r#"
        INSERT INTO products (id, name, description, price, category, image, preview, active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 1)
        ON CONFLICT (id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            price = excluded.price,
            category = excluded.category,
            image = excluded.image,
            preview = excluded.preview,
            active = 1,
            updated_at = CURRENT_TIMESTAMP
        RETURNING *;
    "#,
    )
    .bind(product.id.as_str())
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price.value())
    .bind(product.category.to_string())
    .bind(&product.image)
    .bind(&product.preview)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

pub async fn list_products(include_inactive: bool, conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let sql = if include_inactive {
        "SELECT * FROM products ORDER BY created_at DESC, id"
    } else {
        "SELECT * FROM products WHERE active = 1 ORDER BY created_at DESC, id"
    };
    let products = sqlx::query_as(sql).fetch_all(conn).await?;
    Ok(products)
}

pub async fn deactivate_product(id: &ProductId, conn: &mut SqliteConnection) -> Result<Product, CatalogError> {
    let row: Option<Product> = sqlx::query_as(
        "UPDATE products SET active = 0, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
    )
    .bind(id.as_str())
    .fetch_optional(conn)
    .await?;
    row.ok_or_else(|| CatalogError::ProductNotFound(id.clone()))
}

pub async fn set_product_asset(
    id: &ProductId,
    asset_handle: &str,
    preview: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Product, CatalogError> {
    let row: Option<Product> = sqlx::query_as(
        "UPDATE products SET asset_handle = $1, preview = COALESCE($2, preview), updated_at = CURRENT_TIMESTAMP \
         WHERE id = $3 RETURNING *",
    )
    .bind(asset_handle)
    .bind(preview)
    .bind(id.as_str())
    .fetch_optional(conn)
    .await?;
    row.ok_or_else(|| CatalogError::ProductNotFound(id.clone()))
}
