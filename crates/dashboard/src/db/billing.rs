//! Subscription and billing history repository.

use sqlx::PgPool;

use converty_core::ShopId;

use super::RepositoryError;
use crate::models::{BillingEvent, Subscription};

pub struct BillingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BillingRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The shop's subscription, if one was ever created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn subscription(&self, shop_id: ShopId) -> Result<Option<Subscription>, RepositoryError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r"
            SELECT id, shop_id, plan, status, price, current_period_start, current_period_end
            FROM commerce.subscription
            WHERE shop_id = $1
            ",
        )
        .bind(shop_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(subscription)
    }

    /// Billing events for the shop's subscription, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history(&self, shop_id: ShopId) -> Result<Vec<BillingEvent>, RepositoryError> {
        let events = sqlx::query_as::<_, BillingEvent>(
            r"
            SELECT e.id, e.amount, e.status, e.created_at
            FROM commerce.billing_event e
            JOIN commerce.subscription s ON s.id = e.subscription_id
            WHERE s.shop_id = $1
            ORDER BY e.created_at DESC
            LIMIT 24
            ",
        )
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }
}
