//! Subscription plan and billing history.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::instrument;

use converty_core::{BillingStatus, CurrencyCode, Price, SubscriptionPlan, SubscriptionStatus};

use crate::db::BillingRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::ShopSession;
use crate::models::Subscription;
use crate::state::AppState;

use super::{FlashQuery, ShellView, redirect_error, render};

const BILLING_PATH: &str = "/dashboard/billing";

/// Plan prices are quoted in USD regardless of the shop currency.
fn usd(amount: rust_decimal::Decimal) -> String {
    Price::new(amount, CurrencyCode::USD).display()
}

const fn subscription_status_label(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Active => "Active",
        SubscriptionStatus::Trialing => "Trial",
        SubscriptionStatus::PastDue => "Past due",
        SubscriptionStatus::Cancelled => "Cancelled",
    }
}

const fn billing_status_class(status: BillingStatus) -> &'static str {
    match status {
        BillingStatus::Paid => "badge badge-completed",
        BillingStatus::Pending => "badge badge-pending",
        BillingStatus::Failed => "badge badge-cancelled",
    }
}

#[derive(Debug, Clone)]
pub struct PlanView {
    pub value: &'static str,
    pub name: &'static str,
    pub price: String,
    pub features: &'static [&'static str],
    pub current: bool,
}

#[derive(Debug, Clone)]
pub struct BillingEventView {
    pub date: String,
    pub amount: String,
    pub status: &'static str,
    pub status_class: &'static str,
}

/// The shop's current plan; shops without a subscription row are on Free.
#[derive(Debug, Clone)]
pub struct CurrentPlanView {
    pub name: &'static str,
    pub price: String,
    pub status: &'static str,
    pub period: String,
}

impl CurrentPlanView {
    fn new(subscription: Option<&Subscription>) -> Self {
        subscription.map_or_else(
            || Self {
                name: SubscriptionPlan::Free.name(),
                price: usd(SubscriptionPlan::Free.monthly_price()),
                status: subscription_status_label(SubscriptionStatus::Active),
                period: String::new(),
            },
            |s| {
                let start = s.current_period_start.format("%b %d, %Y");
                let period = s.current_period_end.map_or_else(
                    || format!("Since {start}"),
                    |end| format!("{start} to {}", end.format("%b %d, %Y")),
                );
                Self {
                    name: s.plan.name(),
                    price: usd(s.price),
                    status: subscription_status_label(s.status),
                    period,
                }
            },
        )
    }
}

#[derive(Template)]
#[template(path = "billing/index.html")]
pub struct BillingTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub current: CurrentPlanView,
    pub plans: Vec<PlanView>,
    pub history: Vec<BillingEventView>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeForm {
    #[serde(default)]
    pub plan: String,
}

/// GET /dashboard/billing
#[instrument(skip_all)]
pub async fn show(
    session: ShopSession,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let billing = BillingRepository::new(state.pool());
    let subscription = billing.subscription(session.shop.id).await?;
    let history = billing.history(session.shop.id).await?;
    let current_plan = subscription.as_ref().map_or(SubscriptionPlan::Free, |s| s.plan);

    Ok(render(&BillingTemplate {
        shell: ShellView::new(&state, &session, BILLING_PATH),
        flash,
        current: CurrentPlanView::new(subscription.as_ref()),
        plans: SubscriptionPlan::ALL
            .iter()
            .map(|plan| PlanView {
                value: plan.as_str(),
                name: plan.name(),
                price: usd(plan.monthly_price()),
                features: plan.features(),
                current: *plan == current_plan,
            })
            .collect(),
        history: history
            .iter()
            .map(|event| BillingEventView {
                date: event.created_at.format("%b %d, %Y").to_string(),
                amount: usd(event.amount),
                status: event.status.as_str(),
                status_class: billing_status_class(event.status),
            })
            .collect(),
    }))
}

/// POST /dashboard/billing/upgrade
///
/// Paid plans cannot be purchased yet; the request is acknowledged only.
#[instrument(skip_all)]
pub async fn upgrade(_session: ShopSession, Form(form): Form<UpgradeForm>) -> Response {
    let plan = form
        .plan
        .parse::<SubscriptionPlan>()
        .map_or("selected", |p| p.name());
    tracing::info!(plan = %form.plan, "Plan change requested");

    redirect_error(
        BILLING_PATH,
        &format!("Upgrading to the {plan} plan is not available yet. We will let you know when paid plans launch."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subscription_means_free() {
        let current = CurrentPlanView::new(None);
        assert_eq!(current.name, "Free");
        assert_eq!(current.price, "$0.00");
        assert_eq!(current.status, "Active");
    }
}
