//! Merchant account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use converty_core::{Email, MerchantUserId};

/// A merchant account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MerchantUser {
    pub id: MerchantUserId,
    pub email: Email,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
}
