//! Cash-on-delivery checkout.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use converty_core::{Price, ShopId};

use crate::db::{RepositoryError, StorefrontRepository};
use crate::models::{CheckoutDetails, PlacedOrder, Product};

const MISSING_FIELDS: &str = "Please fill in at least your name, phone and address.";
const TOTAL_TOO_LARGE: &str =
    "This order is too large to place online. Please lower the quantity or contact the shop.";

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Shown to the buyer next to the form.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Raw checkout form. Quantity stays a string so bad input re-renders the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_city: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub customer_notes: String,
    #[serde(default)]
    pub quantity: String,
}

impl CheckoutForm {
    /// Requested quantity, at least one. Unparseable input counts as one.
    #[must_use]
    pub fn quantity(&self) -> i32 {
        self.quantity.trim().parse::<i32>().map_or(1, |q| q.max(1))
    }

    /// # Errors
    ///
    /// Returns `CheckoutError::Invalid` when name, phone or address is blank.
    pub fn validate(&self) -> Result<CheckoutDetails, CheckoutError> {
        let non_blank =
            |value: &str| Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string);

        let (Some(customer_name), Some(customer_phone), Some(customer_address)) = (
            non_blank(&self.customer_name),
            non_blank(&self.customer_phone),
            non_blank(&self.customer_address),
        ) else {
            return Err(CheckoutError::Invalid(MISSING_FIELDS.to_string()));
        };

        Ok(CheckoutDetails {
            customer_name,
            customer_phone,
            customer_city: non_blank(&self.customer_city),
            customer_address,
            customer_notes: non_blank(&self.customer_notes),
            quantity: self.quantity(),
        })
    }
}

fn out_of_stock_message(available: i32) -> String {
    if available <= 0 {
        "Sorry, this product is out of stock.".to_string()
    } else {
        format!("Only {available} left in stock.")
    }
}

/// Reject a request the current stock cannot cover, before touching the database.
///
/// # Errors
///
/// Returns `CheckoutError::Invalid` with the remaining stock.
pub fn check_stock(product: &Product, quantity: i32) -> Result<(), CheckoutError> {
    if quantity > product.quantity {
        return Err(CheckoutError::Invalid(out_of_stock_message(product.quantity)));
    }
    Ok(())
}

/// Reject a quantity whose total could not be stored on the order.
///
/// # Errors
///
/// Returns `CheckoutError::Invalid` when the total is out of range.
pub fn check_total(product: &Product, quantity: i32) -> Result<(), CheckoutError> {
    Price::line_total(product.price, quantity)
        .map(|_| ())
        .ok_or_else(|| CheckoutError::Invalid(TOTAL_TOO_LARGE.to_string()))
}

/// Turn repository failures the buyer can fix into form messages.
fn buyer_facing(err: RepositoryError) -> CheckoutError {
    match err {
        RepositoryError::InsufficientStock { available, .. } => {
            CheckoutError::Invalid(out_of_stock_message(available))
        }
        RepositoryError::NotFound => {
            CheckoutError::Invalid("This product is no longer available.".to_string())
        }
        RepositoryError::TotalTooLarge => CheckoutError::Invalid(TOTAL_TOO_LARGE.to_string()),
        other => CheckoutError::Repository(other),
    }
}

/// Validate the form and place the order.
///
/// The stock check is repeated inside the order transaction; a buyer who
/// loses a race gets the same message as one who asked for too much.
///
/// # Errors
///
/// Returns `CheckoutError::Invalid` for buyer-correctable problems and
/// `CheckoutError::Repository` for anything else.
pub async fn place_order(
    pool: &PgPool,
    shop_id: ShopId,
    product: &Product,
    form: &CheckoutForm,
) -> Result<PlacedOrder, CheckoutError> {
    let details = form.validate()?;
    check_stock(product, details.quantity)?;
    check_total(product, details.quantity)?;

    let placed = StorefrontRepository::new(pool)
        .place_order(shop_id, product.id, &details)
        .await
        .map_err(buyer_facing)?;

    tracing::info!(
        order_id = %placed.order_id,
        product_id = %product.id,
        quantity = placed.quantity,
        "Storefront order placed"
    );

    Ok(placed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use converty_core::ProductId;
    use rust_decimal::Decimal;

    use super::*;

    fn form() -> CheckoutForm {
        CheckoutForm {
            customer_name: " Jane Doe ".to_string(),
            customer_phone: "+1 555 0100".to_string(),
            customer_city: "  ".to_string(),
            customer_address: "1 Main St".to_string(),
            customer_notes: "Ring twice".to_string(),
            quantity: "2".to_string(),
        }
    }

    fn product(quantity: i32) -> Product {
        Product {
            id: ProductId::generate(),
            category_id: None,
            category_name: None,
            name: "Smart Watch".to_string(),
            description: String::new(),
            price: Decimal::from(199),
            compare_at_price: None,
            quantity,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_trims_and_drops_blank_optionals() {
        let details = form().validate().unwrap();
        assert_eq!(details.customer_name, "Jane Doe");
        assert_eq!(details.customer_city, None);
        assert_eq!(details.customer_notes.as_deref(), Some("Ring twice"));
        assert_eq!(details.quantity, 2);
    }

    #[test]
    fn test_validate_requires_name_phone_address() {
        for blank in ["customer_name", "customer_phone", "customer_address"] {
            let mut f = form();
            match blank {
                "customer_name" => f.customer_name = "  ".to_string(),
                "customer_phone" => f.customer_phone = String::new(),
                _ => f.customer_address = "\t".to_string(),
            }
            let err = f.validate().unwrap_err();
            assert_eq!(err.to_string(), MISSING_FIELDS, "{blank}");
        }
    }

    #[test]
    fn test_quantity_is_clamped_to_one() {
        let mut f = form();
        for (raw, expected) in [("0", 1), ("-3", 1), ("abc", 1), ("", 1), (" 4 ", 4)] {
            f.quantity = raw.to_string();
            assert_eq!(f.quantity(), expected, "{raw:?}");
        }
    }

    #[test]
    fn test_check_stock() {
        assert!(check_stock(&product(5), 5).is_ok());
        assert_eq!(
            check_stock(&product(3), 4).unwrap_err().to_string(),
            "Only 3 left in stock."
        );
        assert_eq!(
            check_stock(&product(0), 1).unwrap_err().to_string(),
            "Sorry, this product is out of stock."
        );
    }

    #[test]
    fn test_check_total_rejects_unstorable_amounts() {
        let mut expensive = product(5);
        expensive.price = Price::MAX_AMOUNT;
        assert!(check_total(&expensive, 1).is_ok());
        assert_eq!(
            check_total(&expensive, 2).unwrap_err().to_string(),
            TOTAL_TOO_LARGE
        );
        assert!(check_total(&product(5), 5).is_ok());
    }

    #[test]
    fn test_buyer_facing_repository_errors() {
        assert!(matches!(
            buyer_facing(RepositoryError::TotalTooLarge),
            CheckoutError::Invalid(message) if message == TOTAL_TOO_LARGE
        ));
        assert!(matches!(
            buyer_facing(RepositoryError::InsufficientStock {
                product: "Smart Watch".to_string(),
                available: 2,
            }),
            CheckoutError::Invalid(message) if message == "Only 2 left in stock."
        ));
        assert!(matches!(
            buyer_facing(RepositoryError::NotFound),
            CheckoutError::Invalid(_)
        ));
        assert!(matches!(
            buyer_facing(RepositoryError::DataCorruption("bad".to_string())),
            CheckoutError::Repository(_)
        ));
    }
}
