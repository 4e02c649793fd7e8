//! Storefront business logic.

pub mod checkout;
pub mod pixel;
