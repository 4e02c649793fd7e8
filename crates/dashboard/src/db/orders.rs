//! Order repository.
//!
//! Stock is decremented inside the same transaction that writes the order,
//! with a guarded `UPDATE ... WHERE quantity >= $n`, so concurrent orders can
//! never drive a product's stock below zero.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use converty_core::{OrderId, OrderStatus, PaymentMethod, Price, ProductId, ShopId};

use super::RepositoryError;
use crate::models::{NewOrder, NewOrderLine, Order, OrderItem, OrderStats, OrderWithItems};

const SELECT_ORDER: &str = r"
    SELECT id, shop_id, customer_name, customer_email, customer_phone,
           customer_city, customer_address, customer_notes, status,
           payment_method, total_amount, created_at
    FROM commerce.customer_order
";

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders of a shop, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        shop_id: ShopId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let sql = format!(
            "{SELECT_ORDER} WHERE shop_id = $1 AND ($2::commerce.order_status IS NULL OR status = $2)
             ORDER BY created_at DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(shop_id)
            .bind(status)
            .fetch_all(self.pool)
            .await?;

        self.with_items(orders).await
    }

    /// The `limit` most recent orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn recent(
        &self,
        shop_id: ShopId,
        limit: i64,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let sql = format!("{SELECT_ORDER} WHERE shop_id = $1 ORDER BY created_at DESC LIMIT $2");
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(shop_id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        self.with_items(orders).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(
        &self,
        shop_id: ShopId,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let sql = format!("{SELECT_ORDER} WHERE shop_id = $1 AND id = $2");
        let Some(order) = sqlx::query_as::<_, Order>(&sql)
            .bind(shop_id)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        Ok(self.with_items(vec![order]).await?.pop())
    }

    async fn with_items(&self, orders: Vec<Order>) -> Result<Vec<OrderWithItems>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, product_name, quantity, unit_price, subtotal
            FROM commerce.order_item
            WHERE order_id = ANY($1)
            ORDER BY created_at, id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderWithItems {
                items: by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }

    /// Write a manual order entered by the merchant.
    ///
    /// Prices and names are read from the catalog, not from the draft.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a product is not in this shop and
    /// `RepositoryError::InsufficientStock` if a line exceeds current stock.
    pub async fn create_manual(
        &self,
        shop_id: ShopId,
        order: &NewOrder,
    ) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let requested = lock_order(&order.lines);
        let mut lines = Vec::with_capacity(requested.len());
        for line in requested {
            let (name, price) = take_stock(&mut tx, shop_id, line.product_id, line.quantity).await?;
            let subtotal =
                Price::line_total(price, line.quantity).ok_or(RepositoryError::TotalTooLarge)?;
            lines.push((line.product_id, name, price, line.quantity, subtotal));
        }

        let total = Price::order_total(lines.iter().map(|(.., subtotal)| *subtotal))
            .ok_or(RepositoryError::TotalTooLarge)?;

        let order_id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO commerce.customer_order
                (shop_id, customer_name, customer_email, customer_phone, customer_city,
                 customer_address, customer_notes, status, payment_method, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(&order.customer_name)
        .bind(order.customer_email.as_ref().map(converty_core::Email::as_str))
        .bind(&order.customer_phone)
        .bind(&order.customer_city)
        .bind(&order.customer_address)
        .bind(&order.customer_notes)
        .bind(order.status)
        .bind(PaymentMethod::CashOnDelivery)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        for (product_id, name, price, quantity, subtotal) in &lines {
            sqlx::query(
                r"
                INSERT INTO commerce.order_item
                    (order_id, product_id, product_name, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(order_id)
            .bind(product_id)
            .bind(name)
            .bind(quantity)
            .bind(price)
            .bind(subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order_id)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not in this shop.
    pub async fn update_status(
        &self,
        shop_id: ShopId,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE commerce.customer_order SET status = $3 WHERE shop_id = $1 AND id = $2",
        )
        .bind(shop_id)
        .bind(id)
        .bind(status)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an order and its items. Stock is not restored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not in this shop.
    pub async fn delete(&self, shop_id: ShopId, id: OrderId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM commerce.customer_order WHERE shop_id = $1 AND id = $2")
                .bind(shop_id)
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Product count, order counts and revenue from completed orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self, shop_id: ShopId) -> Result<OrderStats, RepositoryError> {
        let stats = sqlx::query_as::<_, OrderStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM commerce.product WHERE shop_id = $1) AS total_products,
                COUNT(o.id) AS total_orders,
                COUNT(o.id) FILTER (WHERE o.status = $2) AS pending_orders,
                COALESCE(SUM(o.total_amount) FILTER (WHERE o.status::text = ANY($3)), 0) AS revenue
            FROM commerce.customer_order o
            WHERE o.shop_id = $1
            ",
        )
        .bind(shop_id)
        .bind(OrderStatus::Pending)
        .bind(revenue_statuses())
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}

/// Order lines sorted by product id, the order product rows are locked in.
///
/// A fixed lock order keeps concurrent orders sharing products from
/// deadlocking each other.
fn lock_order(lines: &[NewOrderLine]) -> Vec<&NewOrderLine> {
    let mut ordered: Vec<_> = lines.iter().collect();
    ordered.sort_by_key(|line| line.product_id);
    ordered
}

/// Status names whose orders count towards revenue.
fn revenue_statuses() -> Vec<&'static str> {
    OrderStatus::ALL
        .iter()
        .filter(|status| status.counts_as_revenue())
        .map(OrderStatus::as_str)
        .collect()
}

/// Lock a product row, check stock, and decrement it.
///
/// Returns the product name and current unit price.
pub(crate) async fn take_stock(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    shop_id: ShopId,
    product_id: ProductId,
    quantity: i32,
) -> Result<(String, Decimal), RepositoryError> {
    let (name, price, available): (String, Decimal, i32) = sqlx::query_as(
        r"
        SELECT name, price, quantity
        FROM commerce.product
        WHERE shop_id = $1 AND id = $2
        FOR UPDATE
        ",
    )
    .bind(shop_id)
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    let result = sqlx::query(
        r"
        UPDATE commerce.product
        SET quantity = quantity - $3
        WHERE shop_id = $1 AND id = $2 AND quantity >= $3
        ",
    )
    .bind(shop_id)
    .bind(product_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::InsufficientStock {
            product: name,
            available,
        });
    }
    Ok((name, price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_order_sorts_by_product() {
        let mut ids: Vec<ProductId> = (0..4).map(|_| ProductId::generate()).collect();
        let lines: Vec<NewOrderLine> = ids
            .iter()
            .rev()
            .map(|&product_id| NewOrderLine {
                product_id,
                quantity: 1,
            })
            .collect();
        ids.sort();

        let locked: Vec<ProductId> = lock_order(&lines).iter().map(|l| l.product_id).collect();
        assert_eq!(locked, ids);

        // Any permutation of the same lines locks in the same order.
        let mut reversed = lines.clone();
        reversed.reverse();
        let relocked: Vec<ProductId> = lock_order(&reversed).iter().map(|l| l.product_id).collect();
        assert_eq!(relocked, locked);
    }

    #[test]
    fn test_revenue_statuses_follow_order_status() {
        assert_eq!(revenue_statuses(), vec!["completed"]);
        for status in OrderStatus::ALL {
            assert_eq!(
                revenue_statuses().contains(&status.as_str()),
                status.counts_as_revenue()
            );
        }
    }
}
