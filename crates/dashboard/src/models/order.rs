//! Orders, order items and the manual-order draft.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use converty_core::{
    Email, OrderId, OrderItemId, OrderStatus, PaymentMethod, Price, ProductId, ShopId,
};

use super::{Product, ValidationError, optional_text, required_text};

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub shop_id: ShopId,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_city: Option<String>,
    pub customer_address: Option<String>,
    pub customer_notes: Option<String>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A line of an order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    /// Compact item list for tables, e.g. `Headphones x2, Cable x1`.
    ///
    /// Returns `-` for an order without lines.
    #[must_use]
    pub fn item_summary(&self) -> String {
        if self.items.is_empty() {
            return "-".to_string();
        }
        self.items
            .iter()
            .map(|item| format!("{} x{}", item.product_name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Headline numbers for the dashboard overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub revenue: Decimal,
}

/// A product line requested for a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A validated order ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: Option<Email>,
    pub customer_phone: Option<String>,
    pub customer_city: Option<String>,
    pub customer_address: Option<String>,
    pub customer_notes: Option<String>,
    pub status: OrderStatus,
    pub lines: Vec<NewOrderLine>,
}

/// One line of the manual order being built in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraftLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl OrderDraftLine {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Manual order lines kept in the session between form posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub lines: Vec<OrderDraftLine>,
}

impl OrderDraft {
    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the quantity is not positive, the
    /// merged quantity exceeds the product's stock, or the draft total would
    /// not fit an order.
    pub fn add(&mut self, product: &Product, quantity: i32) -> Result<(), ValidationError> {
        if quantity <= 0 {
            return Err(ValidationError::new("Quantity must be at least 1"));
        }

        let existing = self
            .lines
            .iter()
            .position(|line| line.product_id == product.id);
        let already = existing
            .and_then(|i| self.lines.get(i))
            .map_or(0, |line| line.quantity);
        let wanted = already.saturating_add(quantity);

        if wanted > product.quantity {
            return Err(ValidationError::new(format!(
                "Only {} of {} in stock",
                product.quantity, product.name
            )));
        }

        let mut next = self.clone();
        match existing.and_then(|i| next.lines.get_mut(i)) {
            Some(line) => line.quantity = wanted,
            None => next.lines.push(OrderDraftLine {
                product_id: product.id,
                product_name: product.name.clone(),
                unit_price: product.price,
                quantity,
            }),
        }

        let bounded = next
            .lines
            .iter()
            .map(|line| Price::line_total(line.unit_price, line.quantity))
            .collect::<Option<Vec<_>>>()
            .and_then(Price::order_total);
        if bounded.is_none() {
            return Err(ValidationError::new(
                "Order total is larger than a single order can hold",
            ));
        }

        *self = next;
        Ok(())
    }

    /// Remove the line for `product_id`, if present.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(OrderDraftLine::subtotal).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Customer details of the manual order form.
#[derive(Debug, Default, Deserialize)]
pub struct ManualOrderForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_city: Option<String>,
    pub customer_address: Option<String>,
    pub customer_notes: Option<String>,
    pub status: Option<String>,
}

impl ManualOrderForm {
    /// Combine the customer details with the draft lines.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for missing customer details, an invalid
    /// email or status, or an empty draft.
    pub fn validate(self, draft: &OrderDraft) -> Result<NewOrder, ValidationError> {
        let customer_name = required_text(&self.customer_name, "Customer name")?;
        let email = required_text(&self.customer_email, "Customer email")?;
        let customer_email = Email::parse(&email)
            .map_err(|e| ValidationError::new(format!("Customer email: {e}")))?;
        let status = match optional_text(self.status) {
            Some(raw) => raw
                .parse::<OrderStatus>()
                .map_err(|e| ValidationError::new(e.to_string()))?,
            None => OrderStatus::default(),
        };

        if draft.is_empty() {
            return Err(ValidationError::new("Add at least one product"));
        }

        Ok(NewOrder {
            customer_name,
            customer_email: Some(customer_email),
            customer_phone: optional_text(self.customer_phone),
            customer_city: optional_text(self.customer_city),
            customer_address: optional_text(self.customer_address),
            customer_notes: optional_text(self.customer_notes),
            status,
            lines: draft
                .lines
                .iter()
                .map(|line| NewOrderLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use converty_core::ProductStatus;

    use super::*;

    fn product(name: &str, price: &str, stock: i32) -> Product {
        Product {
            id: ProductId::generate(),
            shop_id: ShopId::generate(),
            category_id: None,
            category_name: None,
            name: name.to_string(),
            description: String::new(),
            price: price.parse().unwrap(),
            compare_at_price: None,
            sku: None,
            quantity: stock,
            status: ProductStatus::Published,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn item(name: &str, quantity: i32) -> OrderItem {
        OrderItem {
            id: OrderItemId::generate(),
            order_id: OrderId::generate(),
            product_id: None,
            product_name: name.to_string(),
            quantity,
            unit_price: Decimal::ONE,
            subtotal: Decimal::from(quantity),
        }
    }

    fn order() -> Order {
        Order {
            id: OrderId::generate(),
            shop_id: ShopId::generate(),
            customer_name: "Jane".to_string(),
            customer_email: None,
            customer_phone: Some("555-0100".to_string()),
            customer_city: None,
            customer_address: None,
            customer_notes: None,
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::CashOnDelivery,
            total_amount: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_summary() {
        let with_items = OrderWithItems {
            order: order(),
            items: vec![item("Headphones", 2), item("Cable", 1)],
        };
        assert_eq!(with_items.item_summary(), "Headphones x2, Cable x1");

        let empty = OrderWithItems {
            order: order(),
            items: vec![],
        };
        assert_eq!(empty.item_summary(), "-");
    }

    #[test]
    fn test_draft_merges_same_product() {
        let headphones = product("Headphones", "79.99", 5);
        let mut draft = OrderDraft::default();
        draft.add(&headphones, 2).unwrap();
        draft.add(&headphones, 3).unwrap();

        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].quantity, 5);
        assert_eq!(draft.total(), "399.95".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_draft_rejects_over_stock() {
        let mug = product("Mug", "8", 3);
        let mut draft = OrderDraft::default();
        draft.add(&mug, 2).unwrap();

        let err = draft.add(&mug, 2).unwrap_err();
        assert_eq!(err.to_string(), "Only 3 of Mug in stock");
        assert_eq!(draft.lines[0].quantity, 2);
    }

    #[test]
    fn test_draft_rejects_unstorable_total() {
        let yacht = product("Yacht", "9999999999.99", 10);
        let anchor = product("Anchor", "0.01", 10);
        let mut draft = OrderDraft::default();
        draft.add(&yacht, 1).unwrap();

        let err = draft.add(&yacht, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order total is larger than a single order can hold"
        );
        assert!(draft.add(&anchor, 1).is_err());
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].quantity, 1);
        assert_eq!(draft.total(), Price::MAX_AMOUNT);
    }

    #[test]
    fn test_draft_rejects_non_positive_quantity() {
        let mug = product("Mug", "8", 3);
        let mut draft = OrderDraft::default();
        assert!(draft.add(&mug, 0).is_err());
        assert!(draft.add(&mug, -1).is_err());
        assert!(draft.is_empty());
    }

    #[test]
    fn test_draft_remove() {
        let mug = product("Mug", "8", 3);
        let tee = product("Tee", "20", 10);
        let mut draft = OrderDraft::default();
        draft.add(&mug, 1).unwrap();
        draft.add(&tee, 1).unwrap();
        draft.remove(mug.id);

        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].product_name, "Tee");
    }

    #[test]
    fn test_manual_order_form() {
        let tee = product("Tee", "20", 10);
        let mut draft = OrderDraft::default();
        draft.add(&tee, 2).unwrap();

        let form = ManualOrderForm {
            customer_name: "Jane Doe".to_string(),
            customer_email: "Jane@Example.com".to_string(),
            customer_phone: Some("555-0100".to_string()),
            customer_address: Some("1 Main St".to_string()),
            status: Some("confirmed".to_string()),
            ..ManualOrderForm::default()
        };
        let order = form.validate(&draft).unwrap();

        assert_eq!(order.customer_email.unwrap().as_str(), "jane@example.com");
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(
            order.lines,
            vec![NewOrderLine {
                product_id: tee.id,
                quantity: 2
            }]
        );
    }

    #[test]
    fn test_manual_order_requires_customer_and_items() {
        let form = ManualOrderForm {
            customer_name: "Jane".to_string(),
            customer_email: "jane@example.com".to_string(),
            ..ManualOrderForm::default()
        };
        assert_eq!(
            form.validate(&OrderDraft::default()).unwrap_err().to_string(),
            "Add at least one product"
        );

        let form = ManualOrderForm {
            customer_name: "Jane".to_string(),
            ..ManualOrderForm::default()
        };
        assert!(form.validate(&OrderDraft::default()).is_err());
    }
}
