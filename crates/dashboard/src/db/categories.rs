//! Category repository.

use sqlx::PgPool;

use converty_core::{CategoryId, ShopId};

use super::RepositoryError;
use crate::models::{Category, CategoryInput};

const DUPLICATE_NAME: &str = "a category with that name already exists";

pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a shop's categories in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, shop_id: ShopId) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT id, shop_id, name, description, display_order, created_at
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

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        shop_id: ShopId,
        id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            SELECT id, shop_id, name, description, display_order, created_at
            FROM commerce.category
            WHERE shop_id = $1 AND id = $2
            ",
        )
        .bind(shop_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// Create a category. Without an explicit display order it goes last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already used in this shop.
    pub async fn create(
        &self,
        shop_id: ShopId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO commerce.category (shop_id, name, description, display_order)
            VALUES (
                $1, $2, $3,
                COALESCE($4, (SELECT COALESCE(MAX(display_order) + 1, 0)
                              FROM commerce.category WHERE shop_id = $1))
            )
            RETURNING id, shop_id, name, description, display_order, created_at
            ",
        )
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.display_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, DUPLICATE_NAME))?;

        Ok(category)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is not in this shop,
    /// `RepositoryError::Conflict` if the new name is already used.
    pub async fn update(
        &self,
        shop_id: ShopId,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            UPDATE commerce.category
            SET name = $3,
                description = $4,
                display_order = COALESCE($5, display_order)
            WHERE shop_id = $1 AND id = $2
            RETURNING id, shop_id, name, description, display_order, created_at
            ",
        )
        .bind(shop_id)
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.display_order)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, DUPLICATE_NAME))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category; its products become uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is not in this shop.
    pub async fn delete(&self, shop_id: ShopId, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM commerce.category WHERE shop_id = $1 AND id = $2")
            .bind(shop_id)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
