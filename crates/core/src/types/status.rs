//! Status enums for various entities.
//!
//! Each enum maps to a Postgres enum type in the `commerce` schema and uses
//! the same snake_case spelling in forms, URLs and JSON.

use serde::{Deserialize, Serialize};

/// Error returned when a status string does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct StatusParseError {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` from a single variant table.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored/wire spelling of this variant.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = StatusParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(StatusParseError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

/// Whether a product is visible on the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.product_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Published,
    Draft,
}

string_enum!(ProductStatus, "product status", {
    Published => "published",
    Draft => "draft",
});

impl ProductStatus {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Published => "Published",
            Self::Draft => "Draft",
        }
    }
}

/// Order lifecycle status.
///
/// Orders start `pending`; a merchant moves them through `confirmed` and
/// `shipped` to `completed`, or cancels them. Only `completed` orders count
/// towards revenue. Merchants may set any status from the dashboard, so no
/// transition rules are enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Completed,
    Cancelled,
}

string_enum!(OrderStatus, "order status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Shipped => "shipped",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl OrderStatus {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Shipped => "Shipped",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether the order's total is counted as revenue.
    #[must_use]
    pub const fn counts_as_revenue(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// How an order is paid. Cash on delivery is the only supported method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
}

string_enum!(PaymentMethod, "payment method", {
    CashOnDelivery => "cash_on_delivery",
});

impl PaymentMethod {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on delivery",
        }
    }
}

/// Role granted to an invited team member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.team_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Full access to shop management, including team and billing.
    Admin,
    /// Can manage products, categories and orders.
    #[default]
    Editor,
    /// Read-only access.
    Viewer,
}

string_enum!(TeamRole, "team role", {
    Admin => "admin",
    Editor => "editor",
    Viewer => "viewer",
});

impl TeamRole {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Editor => "Editor",
            Self::Viewer => "Viewer",
        }
    }
}

/// Whether a team invitation has been accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.invite_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Pending,
    Active,
}

string_enum!(InviteStatus, "invite status", {
    Pending => "pending",
    Active => "active",
});

/// Subscription billing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.subscription_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trialing,
    PastDue,
    Cancelled,
}

string_enum!(SubscriptionStatus, "subscription status", {
    Active => "active",
    Trialing => "trialing",
    PastDue => "past_due",
    Cancelled => "cancelled",
});

/// Outcome of a single billing charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "commerce.billing_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Paid,
    Pending,
    Failed,
}

string_enum!(BillingStatus, "billing status", {
    Paid => "paid",
    Pending => "pending",
    Failed => "failed",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip_strings() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_order_status_workflow_order() {
        let names: Vec<_> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
        assert_eq!(
            names,
            ["pending", "confirmed", "shipped", "completed", "cancelled"]
        );
    }

    #[test]
    fn test_only_completed_counts_as_revenue() {
        let counted: Vec<_> = OrderStatus::ALL
            .iter()
            .filter(|s| s.counts_as_revenue())
            .collect();
        assert_eq!(counted, [&OrderStatus::Completed]);
    }

    #[test]
    fn test_parse_error_names_kind() {
        let err = "archived".parse::<ProductStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid product status: archived");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ProductStatus::default(), ProductStatus::Published);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(TeamRole::default(), TeamRole::Editor);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap();
        assert_eq!(json, "\"cash_on_delivery\"");
        let status: SubscriptionStatus = serde_json::from_str("\"past_due\"").unwrap();
        assert_eq!(status, SubscriptionStatus::PastDue);
    }

    #[test]
    fn test_from_str_trims() {
        assert_eq!(" shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
    }
}
