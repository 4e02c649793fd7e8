//! Buyer-facing catalog queries and order placement.

use rust_decimal::Decimal;
use sqlx::PgPool;

use converty_core::{
    CategoryId, OrderId, OrderStatus, PaymentMethod, Price, ProductId, ProductStatus, ShopId, Slug,
};

use super::RepositoryError;
use crate::models::{Category, CheckoutDetails, PlacedOrder, Product, ProductImage, Shop};

const SELECT_PRODUCT: &str = r"
    SELECT p.id, p.category_id, c.name AS category_name, p.name, p.description,
           p.price, p.compare_at_price, p.quantity, p.image_url, p.created_at
    FROM commerce.product p
    LEFT JOIN commerce.category c ON c.id = p.category_id
";

/// Filters of the shop listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    /// Case-insensitive substring of the product name.
    pub query: Option<String>,
}

pub struct StorefrontRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StorefrontRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shop_by_slug(&self, slug: &Slug) -> Result<Option<Shop>, RepositoryError> {
        let shop = sqlx::query_as::<_, Shop>(
            r"
            SELECT id, name, slug, description, contact_email, contact_phone, address,
                   store_currency, facebook_pixel_id, logo_url, banner_url,
                   primary_color, secondary_color, accent_color, font_family
            FROM commerce.shop
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(shop)
    }

    /// Categories of a shop in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self, shop_id: ShopId) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name
            FROM commerce.category
            WHERE shop_id = $1
            ORDER BY display_order, name
            ",
        )
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Published products of a shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn published_products(
        &self,
        shop_id: ShopId,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"{SELECT_PRODUCT}
            WHERE p.shop_id = $1
              AND p.status = $2
              AND ($3::uuid IS NULL OR p.category_id = $3)
              AND ($4::text IS NULL OR strpos(lower(p.name), lower($4)) > 0)
            ORDER BY p.created_at DESC
            "
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(shop_id)
            .bind(ProductStatus::Published)
            .bind(filter.category)
            .bind(filter.query.as_deref())
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// A published product of the shop. Drafts and other shops' products are `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn published_product(
        &self,
        shop_id: ShopId,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.shop_id = $1 AND p.id = $2 AND p.status = $3");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(shop_id)
            .bind(id)
            .bind(ProductStatus::Published)
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_images(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let images = sqlx::query_as::<_, ProductImage>(
            r"
            SELECT id, image_url, sort_order
            FROM commerce.product_image
            WHERE product_id = $1
            ORDER BY sort_order, id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(images)
    }

    /// Place a cash-on-delivery order for one product.
    ///
    /// Stock is locked, checked and decremented in the same transaction as
    /// the order insert, so two buyers can never take the last unit twice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is gone or no longer
    /// published, `RepositoryError::InsufficientStock` if fewer units remain
    /// than requested.
    pub async fn place_order(
        &self,
        shop_id: ShopId,
        product_id: ProductId,
        details: &CheckoutDetails,
    ) -> Result<PlacedOrder, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (product_name, unit_price, available): (String, Decimal, i32) = sqlx::query_as(
            r"
            SELECT name, price, quantity
            FROM commerce.product
            WHERE shop_id = $1 AND id = $2 AND status = $3
            FOR UPDATE
            ",
        )
        .bind(shop_id)
        .bind(product_id)
        .bind(ProductStatus::Published)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let total =
            Price::line_total(unit_price, details.quantity).ok_or(RepositoryError::TotalTooLarge)?;

        let result = sqlx::query(
            r"
            UPDATE commerce.product
            SET quantity = quantity - $3
            WHERE shop_id = $1 AND id = $2 AND quantity >= $3
            ",
        )
        .bind(shop_id)
        .bind(product_id)
        .bind(details.quantity)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::InsufficientStock {
                product: product_name,
                available,
            });
        }

        let order_id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO commerce.customer_order
                (shop_id, customer_name, customer_phone, customer_city,
                 customer_address, customer_notes, status, payment_method, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(&details.customer_name)
        .bind(&details.customer_phone)
        .bind(&details.customer_city)
        .bind(&details.customer_address)
        .bind(&details.customer_notes)
        .bind(OrderStatus::Pending)
        .bind(PaymentMethod::CashOnDelivery)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO commerce.order_item
                (order_id, product_id, product_name, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(&product_name)
        .bind(details.quantity)
        .bind(unit_price)
        .bind(total)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PlacedOrder {
            order_id,
            product_name,
            unit_price,
            quantity: details.quantity,
            total,
        })
    }
}
