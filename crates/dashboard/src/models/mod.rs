//! Domain models for the merchant dashboard.

pub mod billing;
pub mod catalog;
pub mod order;
pub mod session;
pub mod shop;
pub mod team;
pub mod user;

pub use billing::{BillingEvent, Subscription};
pub use catalog::{
    Category, CategoryForm, CategoryInput, Product, ProductForm, ProductImage, ProductInput,
};
pub use order::{
    ManualOrderForm, NewOrder, NewOrderLine, Order, OrderDraft, OrderDraftLine, OrderItem,
    OrderStats, OrderWithItems,
};
pub use session::{CurrentMerchant, keys as session_keys};
pub use shop::{IntegrationsForm, SettingsForm, Shop, ShopSettingsInput, ThemeForm, ThemeInput};
pub use team::{InviteForm, TeamMember};
pub use user::MerchantUser;

/// A form field failed validation; the message is shown to the merchant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trim a free-text form field; blank becomes `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim a required form field.
pub(crate) fn required_text(value: &str, field: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    Ok(value.to_string())
}
