//! Shop (tenant) model plus the settings and theme forms that edit it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use converty_core::{
    CurrencyCode, Email, FontFamily, HexColor, MerchantUserId, PixelId, Price, ShopId, Slug,
};

use super::{ValidationError, optional_text, required_text};

/// A merchant's shop.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Shop {
    pub id: ShopId,
    pub owner_id: MerchantUserId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub store_currency: CurrencyCode,
    pub tax_rate: Decimal,
    pub facebook_pixel_id: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub primary_color: HexColor,
    pub secondary_color: HexColor,
    pub accent_color: HexColor,
    pub font_family: FontFamily,
    pub created_at: DateTime<Utc>,
}

impl Shop {
    /// Whether the merchant has changed anything from the default theme.
    #[must_use]
    pub fn theme_is_customized(&self) -> bool {
        self.primary_color.as_str() != HexColor::DEFAULT_PRIMARY
            || self.secondary_color.as_str() != HexColor::DEFAULT_SECONDARY
            || self.accent_color.as_str() != HexColor::DEFAULT_ACCENT
            || self.font_family != FontFamily::default()
            || self.logo_url.is_some()
            || self.banner_url.is_some()
    }

    /// Format an amount in the shop's currency.
    #[must_use]
    pub fn format_price(&self, amount: Decimal) -> String {
        Price::new(amount, self.store_currency).display()
    }
}

/// Raw general-settings form.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub store_currency: String,
    pub tax_rate: Option<String>,
}

/// Validated general settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSettingsInput {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub contact_email: Option<Email>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub store_currency: CurrencyCode,
    pub tax_rate: Decimal,
}

impl SettingsForm {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first invalid field.
    pub fn validate(self) -> Result<ShopSettingsInput, ValidationError> {
        let name = required_text(&self.name, "Shop name")?;
        let slug = Slug::parse(&self.slug)
            .map_err(|e| ValidationError::new(format!("Shop URL: {e}")))?;
        let contact_email = optional_text(self.contact_email)
            .map(|e| Email::parse(&e))
            .transpose()
            .map_err(|e| ValidationError::new(format!("Contact email: {e}")))?;
        let store_currency = self
            .store_currency
            .parse::<CurrencyCode>()
            .map_err(|e| ValidationError::new(e.to_string()))?;
        let tax_rate = match optional_text(self.tax_rate) {
            Some(raw) => Price::parse_amount(&raw)
                .map_err(|e| ValidationError::new(format!("Tax rate: {e}")))?,
            None => Decimal::ZERO,
        };
        if tax_rate > Decimal::ONE_HUNDRED {
            return Err(ValidationError::new("Tax rate cannot exceed 100%"));
        }

        Ok(ShopSettingsInput {
            name,
            slug,
            description: optional_text(self.description),
            contact_email,
            contact_phone: optional_text(self.contact_phone),
            address: optional_text(self.address),
            store_currency,
            tax_rate,
        })
    }
}

/// Integrations form; a blank pixel id clears the integration.
#[derive(Debug, Deserialize)]
pub struct IntegrationsForm {
    #[serde(default)]
    pub facebook_pixel_id: String,
}

impl IntegrationsForm {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a non-blank, malformed pixel id.
    pub fn validate(&self) -> Result<Option<PixelId>, ValidationError> {
        PixelId::parse_optional(&self.facebook_pixel_id)
            .map_err(|e| ValidationError::new(format!("Facebook Pixel ID: {e}")))
    }
}

/// Text fields of the multipart theme form.
#[derive(Debug, Default)]
pub struct ThemeForm {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub remove_logo: bool,
    pub remove_banner: bool,
}

/// Validated theme values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeInput {
    pub primary_color: HexColor,
    pub secondary_color: HexColor,
    pub accent_color: HexColor,
    pub font_family: FontFamily,
}

impl ThemeForm {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a malformed colour or unknown font.
    pub fn validate(&self) -> Result<ThemeInput, ValidationError> {
        let color = |value: &str, label: &str| {
            HexColor::parse(value).map_err(|e| ValidationError::new(format!("{label}: {e}")))
        };

        Ok(ThemeInput {
            primary_color: color(&self.primary_color, "Primary colour")?,
            secondary_color: color(&self.secondary_color, "Secondary colour")?,
            accent_color: color(&self.accent_color, "Accent colour")?,
            font_family: self
                .font_family
                .parse()
                .map_err(|e: converty_core::StatusParseError| ValidationError::new(e.to_string()))?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn settings_form() -> SettingsForm {
        SettingsForm {
            name: " Tech Store ".to_string(),
            slug: "tech-store".to_string(),
            description: Some(String::new()),
            contact_email: Some("hello@techstore.com".to_string()),
            contact_phone: Some("  ".to_string()),
            address: None,
            store_currency: "usd".to_string(),
            tax_rate: Some("10".to_string()),
        }
    }

    #[test]
    fn test_settings_validate() {
        let input = settings_form().validate().unwrap();
        assert_eq!(input.name, "Tech Store");
        assert_eq!(input.slug.as_str(), "tech-store");
        assert_eq!(input.description, None);
        assert_eq!(input.contact_phone, None);
        assert_eq!(input.store_currency, CurrencyCode::USD);
        assert_eq!(input.tax_rate, Decimal::from(10));
    }

    #[test]
    fn test_settings_rejects_bad_values() {
        let mut form = settings_form();
        form.name = "   ".to_string();
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Shop name is required"
        );

        let mut form = settings_form();
        form.slug = "Tech Store".to_string();
        assert!(form.validate().is_err());

        let mut form = settings_form();
        form.tax_rate = Some("150".to_string());
        assert!(form.validate().is_err());

        let mut form = settings_form();
        form.contact_email = Some("nope".to_string());
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_blank_tax_rate_is_zero() {
        let mut form = settings_form();
        form.tax_rate = Some(String::new());
        assert_eq!(form.validate().unwrap().tax_rate, Decimal::ZERO);
    }

    #[test]
    fn test_integrations_blank_clears() {
        let form = IntegrationsForm {
            facebook_pixel_id: "  ".to_string(),
        };
        assert_eq!(form.validate().unwrap(), None);

        let form = IntegrationsForm {
            facebook_pixel_id: "123456789012345".to_string(),
        };
        assert!(form.validate().unwrap().is_some());

        let form = IntegrationsForm {
            facebook_pixel_id: "<script>".to_string(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_theme_validate() {
        let form = ThemeForm {
            primary_color: "#FF0000".to_string(),
            secondary_color: "#00ff00".to_string(),
            accent_color: "#0000ff".to_string(),
            font_family: "serif".to_string(),
            ..ThemeForm::default()
        };
        let theme = form.validate().unwrap();
        assert_eq!(theme.primary_color.as_str(), "#ff0000");
        assert_eq!(theme.font_family, FontFamily::Serif);

        let bad = ThemeForm {
            primary_color: "red".to_string(),
            ..form
        };
        assert!(bad.validate().is_err());
    }
}
