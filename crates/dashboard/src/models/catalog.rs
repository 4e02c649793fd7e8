//! Categories, products and product images.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use converty_core::{
    CategoryId, Price, ProductId, ProductImageId, ProductStatus, ShopId,
};

use super::{ValidationError, optional_text, required_text};

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub shop_id: ShopId,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Category create/edit form.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub display_order: Option<String>,
}

/// Validated category fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub display_order: Option<i32>,
}

impl CategoryForm {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name or non-numeric order.
    pub fn validate(self) -> Result<CategoryInput, ValidationError> {
        let display_order = optional_text(self.display_order)
            .map(|raw| {
                raw.parse::<i32>()
                    .map_err(|_| ValidationError::new("Display order must be a whole number"))
            })
            .transpose()?;

        Ok(CategoryInput {
            name: required_text(&self.name, "Category name")?,
            description: optional_text(self.description),
            display_order,
        })
    }
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub sku: Option<String>,
    pub quantity: i32,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// A gallery image belonging to a product.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub image_url: String,
    pub storage_key: String,
    pub sort_order: i32,
}

/// Text fields of the product form.
///
/// Arrives urlencoded on edit and as multipart fields on create.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub compare_at_price: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub status: String,
}

impl ProductForm {
    /// Assign a multipart text field by name; unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "description" => self.description = value,
            "price" => self.price = value,
            "compare_at_price" => self.compare_at_price = value,
            "sku" => self.sku = value,
            "quantity" => self.quantity = value,
            "category_id" => self.category_id = value,
            "status" => self.status = value,
            _ => {}
        }
    }

    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first invalid field.
    pub fn validate(&self) -> Result<ProductInput, ValidationError> {
        let name = required_text(&self.name, "Product name")?;
        let price = Price::parse_amount(&self.price)
            .map_err(|e| ValidationError::new(format!("Price: {e}")))?;
        let compare_at_price = match self.compare_at_price.trim() {
            "" => None,
            raw => Some(
                Price::parse_amount(raw)
                    .map_err(|e| ValidationError::new(format!("Compare-at price: {e}")))?,
            ),
        };
        let quantity = match self.quantity.trim() {
            "" => 0,
            raw => raw
                .parse::<i32>()
                .ok()
                .filter(|q| *q >= 0)
                .ok_or_else(|| ValidationError::new("Stock must be a whole number, 0 or more"))?,
        };
        let category_id = match self.category_id.trim() {
            "" => None,
            raw => Some(
                raw.parse::<CategoryId>()
                    .map_err(|_| ValidationError::new("Unknown category"))?,
            ),
        };
        let status = match self.status.trim() {
            "" => ProductStatus::default(),
            raw => raw
                .parse::<ProductStatus>()
                .map_err(|e| ValidationError::new(e.to_string()))?,
        };
        let sku = Some(self.sku.trim().to_string()).filter(|s| !s.is_empty());

        Ok(ProductInput {
            name,
            description: self.description.trim().to_string(),
            price,
            compare_at_price,
            sku,
            quantity,
            category_id,
            status,
        })
    }
}

/// Validated product fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub sku: Option<String>,
    pub quantity: i32,
    pub category_id: Option<CategoryId>,
    pub status: ProductStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_form() -> ProductForm {
        ProductForm {
            name: "Wireless Headphones".to_string(),
            description: " Noise cancelling ".to_string(),
            price: "79.99".to_string(),
            compare_at_price: "99.99".to_string(),
            sku: "WH-001".to_string(),
            quantity: "25".to_string(),
            category_id: String::new(),
            status: "published".to_string(),
        }
    }

    #[test]
    fn test_product_validate() {
        let input = product_form().validate().unwrap();
        assert_eq!(input.name, "Wireless Headphones");
        assert_eq!(input.description, "Noise cancelling");
        assert_eq!(input.price, "79.99".parse::<Decimal>().unwrap());
        assert_eq!(
            input.compare_at_price,
            Some("99.99".parse::<Decimal>().unwrap())
        );
        assert_eq!(input.sku.as_deref(), Some("WH-001"));
        assert_eq!(input.quantity, 25);
        assert_eq!(input.category_id, None);
        assert_eq!(input.status, ProductStatus::Published);
    }

    #[test]
    fn test_product_optional_fields_default() {
        let form = ProductForm {
            name: "Mug".to_string(),
            price: "8".to_string(),
            ..ProductForm::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.quantity, 0);
        assert_eq!(input.sku, None);
        assert_eq!(input.compare_at_price, None);
        assert_eq!(input.status, ProductStatus::Published);
    }

    #[test]
    fn test_product_rejects_invalid() {
        let mut form = product_form();
        form.name = String::new();
        assert!(form.validate().is_err());

        let mut form = product_form();
        form.price = "free".to_string();
        assert!(form.validate().is_err());

        let mut form = product_form();
        form.quantity = "-3".to_string();
        assert!(form.validate().is_err());

        let mut form = product_form();
        form.category_id = "not-a-uuid".to_string();
        assert!(form.validate().is_err());

        let mut form = product_form();
        form.status = "archived".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_set_field() {
        let mut form = ProductForm::default();
        form.set_field("name", "Tee".to_string());
        form.set_field("status", "draft".to_string());
        form.set_field("images", "ignored".to_string());
        assert_eq!(form.name, "Tee");
        assert_eq!(form.status, "draft");
    }

    #[test]
    fn test_category_validate() {
        let form = CategoryForm {
            name: "  Electronics ".to_string(),
            description: Some(String::new()),
            display_order: Some("2".to_string()),
        };
        let input = form.validate().unwrap();
        assert_eq!(input.name, "Electronics");
        assert_eq!(input.description, None);
        assert_eq!(input.display_order, Some(2));

        let blank = CategoryForm::default();
        assert!(blank.validate().is_err());
    }
}
