//! Session-related types for merchant authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use converty_core::{Email, MerchantUserId};

/// Session-stored merchant identity.
///
/// Only the identity lives in the session; the shop row is reloaded on every
/// dashboard request so settings changes are visible immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentMerchant {
    /// Merchant's database ID.
    pub id: MerchantUserId,
    /// Merchant's email address.
    pub email: Email,
}

/// Session keys for merchant authentication data.
pub mod keys {
    /// Key for storing the current logged-in merchant.
    pub const CURRENT_MERCHANT: &str = "current_merchant";

    /// Key for the manual order being assembled on `/dashboard/orders/new`.
    pub const ORDER_DRAFT: &str = "order_draft";
}
