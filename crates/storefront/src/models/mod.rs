//! Catalog rows as the storefront reads them.
//!
//! These are read-only projections of the dashboard's tables: only the
//! columns a buyer-facing page needs are selected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use converty_core::{
    CategoryId, CurrencyCode, FontFamily, HexColor, OrderId, Price, ProductId, ProductImageId,
    ShopId, Slug,
};

/// A shop as shown to buyers.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub store_currency: CurrencyCode,
    pub facebook_pixel_id: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub primary_color: HexColor,
    pub secondary_color: HexColor,
    pub accent_color: HexColor,
    pub font_family: FontFamily,
}

impl Shop {
    /// Format an amount in the shop's currency.
    #[must_use]
    pub fn format_price(&self, amount: Decimal) -> String {
        Price::new(amount, self.store_currency).display()
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("/shop/{}", self.slug)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A published product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Compare-at price, only when it is actually higher than the price.
    #[must_use]
    pub fn sale_reference(&self) -> Option<Decimal> {
        self.compare_at_price.filter(|compare| *compare > self.price)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub image_url: String,
    pub sort_order: i32,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub total: Decimal,
}

/// Customer details of a storefront order, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_city: Option<String>,
    pub customer_address: String,
    pub customer_notes: Option<String>,
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, compare_at: Option<i64>) -> Product {
        Product {
            id: ProductId::generate(),
            category_id: None,
            category_name: None,
            name: "Wireless Headphones".to_string(),
            description: String::new(),
            price: Decimal::from(price),
            compare_at_price: compare_at.map(Decimal::from),
            quantity: 0,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sale_reference_requires_higher_compare_price() {
        assert_eq!(product(80, Some(100)).sale_reference(), Some(Decimal::from(100)));
        assert_eq!(product(80, Some(80)).sale_reference(), None);
        assert_eq!(product(80, Some(50)).sale_reference(), None);
        assert_eq!(product(80, None).sale_reference(), None);
    }

    #[test]
    fn test_out_of_stock() {
        assert!(!product(10, None).in_stock());
    }
}
