//! Merchant account repository.
//!
//! Sign-up creates the account, its shop and a free subscription in one
//! transaction so a merchant can never exist without a shop.

use sqlx::PgPool;

use converty_core::{Email, MerchantUserId, SubscriptionPlan};

use super::RepositoryError;
use crate::models::{MerchantUser, Shop};

/// Details for a brand new merchant and shop.
#[derive(Debug, Clone)]
pub struct NewMerchant<'a> {
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub shop_name: &'a str,
    pub shop_slug: &'a converty_core::Slug,
    pub email_confirmed: bool,
}

/// Repository for merchant account operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a merchant by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: MerchantUserId) -> Result<Option<MerchantUser>, RepositoryError> {
        let user = sqlx::query_as::<_, MerchantUser>(
            r"
            SELECT id, email, email_confirmed, created_at
            FROM commerce.merchant_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a merchant by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<MerchantUser>, RepositoryError> {
        let user = sqlx::query_as::<_, MerchantUser>(
            r"
            SELECT id, email, email_confirmed, created_at
            FROM commerce.merchant_user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a merchant together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(MerchantUser, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            user: MerchantUser,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, Row>(
            r"
            SELECT id, email, email_confirmed, created_at, password_hash
            FROM commerce.merchant_user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Whether a shop already uses `slug`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn slug_taken(&self, slug: &converty_core::Slug) -> Result<bool, RepositoryError> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM commerce.shop WHERE slug = $1)")
                .bind(slug)
                .fetch_one(self.pool)
                .await?;

        Ok(taken)
    }

    /// Create a merchant, their shop and a free subscription.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or shop slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_shop(
        &self,
        new: NewMerchant<'_>,
    ) -> Result<(MerchantUser, Shop), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, MerchantUser>(
            r"
            INSERT INTO commerce.merchant_user (email, password_hash, email_confirmed)
            VALUES ($1, $2, $3)
            RETURNING id, email, email_confirmed, created_at
            ",
        )
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.email_confirmed)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "email already registered"))?;

        let shop = sqlx::query_as::<_, Shop>(
            r"
            INSERT INTO commerce.shop (owner_id, name, slug)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(user.id)
        .bind(new.shop_name)
        .bind(new.shop_slug)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "shop URL already taken"))?;

        sqlx::query(
            r"
            INSERT INTO commerce.subscription (shop_id, plan, price)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(shop.id)
        .bind(SubscriptionPlan::Free)
        .bind(SubscriptionPlan::Free.monthly_price())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((user, shop))
    }

    /// Replace a merchant's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the merchant does not exist.
    pub async fn update_password_hash(
        &self,
        id: MerchantUserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE commerce.merchant_user SET password_hash = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
