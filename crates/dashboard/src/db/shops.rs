//! Shop repository: settings, integrations and theme.

use sqlx::PgPool;

use converty_core::{MerchantUserId, PixelId, ShopId};

use super::RepositoryError;
use crate::models::{Shop, ShopSettingsInput, ThemeInput};

/// Repository for the merchant's own shop row.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the shop owned by a merchant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_owner(&self, owner_id: MerchantUserId) -> Result<Option<Shop>, RepositoryError> {
        let shop = sqlx::query_as::<_, Shop>("SELECT * FROM commerce.shop WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(shop)
    }

    /// Update general settings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new slug belongs to another shop.
    pub async fn update_settings(
        &self,
        shop_id: ShopId,
        input: &ShopSettingsInput,
    ) -> Result<Shop, RepositoryError> {
        sqlx::query_as::<_, Shop>(
            r"
            UPDATE commerce.shop
            SET name = $2,
                slug = $3,
                description = $4,
                contact_email = $5,
                contact_phone = $6,
                address = $7,
                store_currency = $8,
                tax_rate = $9
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.contact_email.as_ref().map(converty_core::Email::as_str))
        .bind(&input.contact_phone)
        .bind(&input.address)
        .bind(input.store_currency)
        .bind(input.tax_rate)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "that shop URL is already taken"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Set or clear the Facebook Pixel ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    pub async fn update_integrations(
        &self,
        shop_id: ShopId,
        pixel_id: Option<&PixelId>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE commerce.shop SET facebook_pixel_id = $2 WHERE id = $1")
            .bind(shop_id)
            .bind(pixel_id.map(PixelId::as_str))
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Update theme colours and font. `logo_url`/`banner_url` of `None`
    /// leave the current image unchanged; `Some(None)` clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    pub async fn update_theme(
        &self,
        shop_id: ShopId,
        theme: &ThemeInput,
        logo_url: Option<Option<&str>>,
        banner_url: Option<Option<&str>>,
    ) -> Result<Shop, RepositoryError> {
        sqlx::query_as::<_, Shop>(
            r"
            UPDATE commerce.shop
            SET primary_color = $2,
                secondary_color = $3,
                accent_color = $4,
                font_family = $5,
                logo_url = CASE WHEN $6 THEN $7 ELSE logo_url END,
                banner_url = CASE WHEN $8 THEN $9 ELSE banner_url END
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(shop_id)
        .bind(&theme.primary_color)
        .bind(&theme.secondary_color)
        .bind(&theme.accent_color)
        .bind(theme.font_family)
        .bind(logo_url.is_some())
        .bind(logo_url.flatten())
        .bind(banner_url.is_some())
        .bind(banner_url.flatten())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
