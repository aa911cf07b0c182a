use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{LineItem, NewOrder, Order, OrderId, OrderStatusType},
    traits::PaymentLedgerError,
};

/// Inserts the order row. The caller supplies the generated public id, correlation token, and the precomputed total;
/// line items are written separately inside the same transaction.
pub async fn insert_order(
    order: &NewOrder,
    order_id: &OrderId,
    correlation_token: &str,
    total_price: i64,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentLedgerError> {
    let inserted = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer_name,
                phone,
                address,
                country,
                email,
                payment_method,
                total_price,
                correlation_token
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(&order.customer_name)
    .bind(&order.phone)
    .bind(&order.address)
    .bind(&order.country)
    .bind(&order.email)
    .bind(order.payment_method.to_string())
    .bind(total_price)
    .bind(correlation_token)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order {order_id} inserted");
    Ok(inserted)
}

/// Writes the frozen line items for an order. Insert-only; there is no update path for line items anywhere.
pub async fn insert_line_items(
    order_id: &OrderId,
    items: &[LineItem],
    conn: &mut SqliteConnection,
) -> Result<(), PaymentLedgerError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, name, unit_price, quantity, category)
            VALUES ($1, $2, $3, $4, $5, $6);
        "#,
        )
        .bind(order_id.as_str())
        .bind(item.product_id.as_str())
        .bind(&item.name)
        .bind(item.unit_price.value())
        .bind(item.quantity)
        .bind(item.category.to_string())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Resolves an order from the correlation token echoed back by a payment provider. This is the only lookup the
/// confirmation paths are allowed to use.
pub async fn fetch_order_by_token(token: &str, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE correlation_token = $1").bind(token).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_line_items(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<LineItem>, sqlx::Error> {
    let items = sqlx::query_as(
        "SELECT product_id, name, unit_price, quantity, category FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id.as_str())
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Compare-and-set status update. The `AND status = $3` guard makes this the single dedup point for duplicated or
/// racing confirmation deliveries: losers match zero rows and get `None` back.
pub async fn update_status_if(
    order_id: &OrderId,
    expected: OrderStatusType,
    new_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, PaymentLedgerError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 AND status = $3 \
         RETURNING *",
    )
    .bind(new_status.to_string())
    .bind(order_id.as_str())
    .bind(expected.to_string())
    .fetch_optional(conn)
    .await?;
    trace!("📝️ CAS {order_id} {expected}->{new_status}: {}", if result.is_some() { "applied" } else { "lost" });
    Ok(result)
}

pub async fn fetch_orders_newest_first(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(conn).await?;
    Ok(orders)
}

/// Removes every order and line item. Returns the number of orders deleted.
pub async fn delete_all_orders(conn: &mut SqliteConnection) -> Result<u64, PaymentLedgerError> {
    sqlx::query("DELETE FROM order_items").execute(&mut *conn).await?;
    let res = sqlx::query("DELETE FROM orders").execute(conn).await?;
    Ok(res.rows_affected())
}

/// The entitlement query: does a settled order for this buyer contain this product?
pub async fn settled_order_exists(
    email: &str,
    product_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let exists: (i64,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM orders o
            JOIN order_items i ON i.order_id = o.order_id
            WHERE o.email = $1
              AND o.status IN ('Paid', 'Fulfilled')
              AND i.product_id = $2
        );
    "#,
    )
    .bind(email)
    .bind(product_id)
    .fetch_one(conn)
    .await?;
    Ok(exists.0 != 0)
}
