//! Product and product image repository.

use sqlx::PgPool;

use converty_core::{ProductId, ProductImageId, ProductStatus, ShopId};

use super::RepositoryError;
use crate::models::{Product, ProductImage, ProductInput};

const DUPLICATE_SKU: &str = "another product already uses that SKU";

const SELECT_PRODUCT: &str = r"
    SELECT p.id, p.shop_id, p.category_id, c.name AS category_name, p.name,
           p.description, p.price, p.compare_at_price, p.sku, p.quantity,
           p.status, p.image_url, p.created_at
    FROM commerce.product p
    LEFT JOIN commerce.category c ON c.id = p.category_id
";

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products of a shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, shop_id: ShopId) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.shop_id = $1 ORDER BY p.created_at DESC");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(shop_id)
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// Published products, by name, for the manual order picker.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self, shop_id: ShopId) -> Result<Vec<Product>, RepositoryError> {
        let sql =
            format!("{SELECT_PRODUCT} WHERE p.shop_id = $1 AND p.status = $2 ORDER BY p.name");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(shop_id)
            .bind(ProductStatus::Published)
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, shop_id: ShopId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commerce.product WHERE shop_id = $1")
            .bind(shop_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, shop_id: ShopId, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.shop_id = $1 AND p.id = $2");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(shop_id)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
    }

    /// Insert a product and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU is already used in this shop.
    pub async fn create(&self, shop_id: ShopId, input: &ProductInput) -> Result<ProductId, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO commerce.product
                (shop_id, category_id, name, description, price, compare_at_price,
                 sku, quantity, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(shop_id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.compare_at_price)
        .bind(&input.sku)
        .bind(input.quantity)
        .bind(input.status)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, DUPLICATE_SKU))?;

        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in this shop,
    /// `RepositoryError::Conflict` if the SKU is already used.
    pub async fn update(
        &self,
        shop_id: ShopId,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE commerce.product
            SET category_id = $3,
                name = $4,
                description = $5,
                price = $6,
                compare_at_price = $7,
                sku = $8,
                quantity = $9,
                status = $10
            WHERE shop_id = $1 AND id = $2
            ",
        )
        .bind(shop_id)
        .bind(id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.compare_at_price)
        .bind(&input.sku)
        .bind(input.quantity)
        .bind(input.status)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, DUPLICATE_SKU))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a product. Image rows cascade; order items keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in this shop.
    pub async fn delete(&self, shop_id: ShopId, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM commerce.product WHERE shop_id = $1 AND id = $2")
            .bind(shop_id)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Gallery images of a product in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images(&self, shop_id: ShopId, id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        let images = sqlx::query_as::<_, ProductImage>(
            r"
            SELECT i.id, i.product_id, i.image_url, i.storage_key, i.sort_order
            FROM commerce.product_image i
            JOIN commerce.product p ON p.id = i.product_id
            WHERE p.shop_id = $1 AND i.product_id = $2
            ORDER BY i.sort_order, i.created_at
            ",
        )
        .bind(shop_id)
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(images)
    }

    /// Append uploaded images after any existing ones and point the product's
    /// main image at the first gallery image.
    ///
    /// `images` holds `(public_url, storage_key)` pairs in upload order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in this shop.
    pub async fn attach_images(
        &self,
        shop_id: ShopId,
        id: ProductId,
        images: &[(String, String)],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let next_order: Option<i32> = sqlx::query_scalar(
            r"
            SELECT COALESCE(MAX(i.sort_order) + 1, 0)
            FROM commerce.product p
            LEFT JOIN commerce.product_image i ON i.product_id = p.id
            WHERE p.shop_id = $1 AND p.id = $2
            GROUP BY p.id
            ",
        )
        .bind(shop_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut sort_order = next_order.ok_or(RepositoryError::NotFound)?;

        for (url, key) in images {
            sqlx::query(
                r"
                INSERT INTO commerce.product_image (product_id, image_url, storage_key, sort_order)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(id)
            .bind(url)
            .bind(key)
            .bind(sort_order)
            .execute(&mut *tx)
            .await?;
            sort_order += 1;
        }

        refresh_main_image(&mut tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete one gallery image and return it so its file can be removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image is not on this shop's product.
    pub async fn delete_image(
        &self,
        shop_id: ShopId,
        product_id: ProductId,
        image_id: ProductImageId,
    ) -> Result<ProductImage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let image = sqlx::query_as::<_, ProductImage>(
            r"
            DELETE FROM commerce.product_image i
            USING commerce.product p
            WHERE p.id = i.product_id
              AND p.shop_id = $1
              AND i.product_id = $2
              AND i.id = $3
            RETURNING i.id, i.product_id, i.image_url, i.storage_key, i.sort_order
            ",
        )
        .bind(shop_id)
        .bind(product_id)
        .bind(image_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        refresh_main_image(&mut tx, product_id).await?;
        tx.commit().await?;
        Ok(image)
    }
}

/// Point `product.image_url` at the first gallery image, or clear it.
async fn refresh_main_image(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: ProductId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        UPDATE commerce.product
        SET image_url = (
            SELECT image_url FROM commerce.product_image
            WHERE product_id = $1
            ORDER BY sort_order, created_at
            LIMIT 1
        )
        WHERE id = $1
        ",
    )
    .bind(product_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
