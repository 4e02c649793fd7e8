//! Team invitation repository.

use sqlx::PgPool;

use converty_core::{Email, MerchantUserId, ShopId, TeamMemberId, TeamRole};

use super::RepositoryError;
use crate::models::TeamMember;

pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, shop_id: ShopId) -> Result<Vec<TeamMember>, RepositoryError> {
        let members = sqlx::query_as::<_, TeamMember>(
            r"
            SELECT id, shop_id, user_email, role, status, created_at
            FROM commerce.team_member
            WHERE shop_id = $1
            ORDER BY created_at
            ",
        )
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(members)
    }

    /// Record a pending invitation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email was already invited.
    pub async fn invite(
        &self,
        shop_id: ShopId,
        email: &Email,
        role: TeamRole,
        invited_by: MerchantUserId,
    ) -> Result<TeamMember, RepositoryError> {
        let member = sqlx::query_as::<_, TeamMember>(
            r"
            INSERT INTO commerce.team_member (shop_id, user_email, role, invited_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, shop_id, user_email, role, status, created_at
            ",
        )
        .bind(shop_id)
        .bind(email)
        .bind(role)
        .bind(invited_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "that email has already been invited"))?;

        Ok(member)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member is not in this shop.
    pub async fn remove(&self, shop_id: ShopId, id: TeamMemberId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM commerce.team_member WHERE shop_id = $1 AND id = $2")
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
