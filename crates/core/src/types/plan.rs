//! Subscription plans and their catalog entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A subscription plan a shop can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.subscription_plan", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Starter,
    Pro,
}

impl SubscriptionPlan {
    pub const ALL: [Self; 3] = [Self::Free, Self::Starter, Self::Pro];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Pro => "pro",
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Starter => "Starter",
            Self::Pro => "Pro",
        }
    }

    /// Monthly price in USD.
    #[must_use]
    pub fn monthly_price(&self) -> Decimal {
        match self {
            Self::Free => Decimal::ZERO,
            Self::Starter => Decimal::from(29),
            Self::Pro => Decimal::from(99),
        }
    }

    /// Maximum number of products, `None` when unlimited.
    #[must_use]
    pub const fn product_limit(&self) -> Option<i64> {
        match self {
            Self::Free => Some(10),
            Self::Starter => Some(100),
            Self::Pro => None,
        }
    }

    #[must_use]
    pub const fn features(&self) -> &'static [&'static str] {
        match self {
            Self::Free => &["Up to 10 products", "Basic analytics", "Email support"],
            Self::Starter => &[
                "Up to 100 products",
                "Advanced analytics",
                "Priority support",
                "API access",
            ],
            Self::Pro => &[
                "Unlimited products",
                "Full analytics",
                "24/7 support",
                "API access",
                "Custom domain",
                "Advanced integrations",
            ],
        }
    }

    /// Whether a shop holding `current_products` may add another one.
    #[must_use]
    pub fn allows_another_product(&self, current_products: i64) -> bool {
        self.product_limit()
            .is_none_or(|limit| current_products < limit)
    }
}

impl core::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionPlan {
    type Err = crate::StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| crate::StatusParseError {
                kind: "subscription plan",
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_prices() {
        assert_eq!(SubscriptionPlan::Free.monthly_price(), Decimal::ZERO);
        assert_eq!(SubscriptionPlan::Starter.monthly_price(), Decimal::from(29));
        assert_eq!(SubscriptionPlan::Pro.monthly_price(), Decimal::from(99));
    }

    #[test]
    fn test_product_limits() {
        assert!(SubscriptionPlan::Free.allows_another_product(9));
        assert!(!SubscriptionPlan::Free.allows_another_product(10));
        assert!(SubscriptionPlan::Starter.allows_another_product(99));
        assert!(!SubscriptionPlan::Starter.allows_another_product(100));
        assert!(SubscriptionPlan::Pro.allows_another_product(1_000_000));
    }

    #[test]
    fn test_features_listed() {
        assert_eq!(SubscriptionPlan::Free.features().len(), 3);
        assert!(SubscriptionPlan::Pro.features().contains(&"Custom domain"));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "starter".parse::<SubscriptionPlan>().unwrap(),
            SubscriptionPlan::Starter
        );
        assert!("enterprise".parse::<SubscriptionPlan>().is_err());
    }
}
