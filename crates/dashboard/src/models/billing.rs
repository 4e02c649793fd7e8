//! Subscription and billing history models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use converty_core::{
    BillingEventId, BillingStatus, ShopId, SubscriptionId, SubscriptionPlan, SubscriptionStatus,
};

/// A shop's current subscription.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub shop_id: ShopId,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub price: Decimal,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: Option<DateTime<Utc>>,
}

/// One charge against a subscription.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BillingEvent {
    pub id: BillingEventId,
    pub amount: Decimal,
    pub status: BillingStatus,
    pub created_at: DateTime<Utc>,
}
