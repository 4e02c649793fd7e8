//! Dashboard overview: headline numbers, recent orders and the
//! getting-started checklist.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Response,
};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::ShopSession;
use crate::models::{OrderStats, OrderWithItems, Shop};
use crate::state::AppState;

use super::orders::OrderRowView;
use super::{FlashQuery, ShellView, render};

/// Orders shown under "Recent orders".
const RECENT_ORDERS: i64 = 5;

/// One entry of the getting-started checklist.
#[derive(Debug, Clone)]
pub struct ChecklistItem {
    pub label: &'static str,
    pub href: String,
    pub done: bool,
}

/// Build the checklist from what the merchant has already set up.
#[must_use]
pub fn checklist(shop: &Shop, stats: &OrderStats, shop_url: &str) -> Vec<ChecklistItem> {
    vec![
        ChecklistItem {
            label: "Create your account",
            href: "/dashboard/settings".to_string(),
            done: true,
        },
        ChecklistItem {
            label: "Add your first product",
            href: "/dashboard/products/new".to_string(),
            done: stats.total_products > 0,
        },
        ChecklistItem {
            label: "Customize your theme",
            href: "/dashboard/theme".to_string(),
            done: shop.theme_is_customized(),
        },
        ChecklistItem {
            label: "Share your storefront",
            href: shop_url.to_string(),
            done: stats.total_orders > 0,
        },
    ]
}

#[derive(Template)]
#[template(path = "dashboard/index.html")]
pub struct OverviewTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub total_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub revenue: String,
    pub recent_orders: Vec<OrderRowView>,
    pub checklist: Vec<ChecklistItem>,
    pub checklist_done: usize,
}

/// GET /dashboard
#[instrument(skip_all)]
pub async fn overview(
    session: ShopSession,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let orders = OrderRepository::new(state.pool());
    let stats = orders.stats(session.shop.id).await?;
    let recent: Vec<OrderWithItems> = orders.recent(session.shop.id, RECENT_ORDERS).await?;

    let shell = ShellView::new(&state, &session, "/dashboard");
    let checklist = checklist(&session.shop, &stats, &shell.shop_url);
    let checklist_done = checklist.iter().filter(|item| item.done).count();

    Ok(render(&OverviewTemplate {
        total_products: stats.total_products,
        total_orders: stats.total_orders,
        pending_orders: stats.pending_orders,
        revenue: session.shop.format_price(stats.revenue),
        recent_orders: recent
            .iter()
            .map(|o| OrderRowView::new(o, &session.shop))
            .collect(),
        checklist,
        checklist_done,
        shell,
        flash,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use converty_core::{
        CurrencyCode, FontFamily, HexColor, MerchantUserId, ShopId, Slug,
    };

    use super::*;

    fn shop() -> Shop {
        Shop {
            id: ShopId::generate(),
            owner_id: MerchantUserId::generate(),
            name: "Tech Store".to_string(),
            slug: Slug::parse("tech-store").unwrap(),
            description: None,
            contact_email: None,
            contact_phone: None,
            address: None,
            store_currency: CurrencyCode::USD,
            tax_rate: Decimal::ZERO,
            facebook_pixel_id: None,
            logo_url: None,
            banner_url: None,
            primary_color: HexColor::default_primary(),
            secondary_color: HexColor::default_secondary(),
            accent_color: HexColor::default_accent(),
            font_family: FontFamily::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_checklist_for_new_shop() {
        let items = checklist(&shop(), &OrderStats::default(), "http://localhost:3000/shop/tech-store");
        assert_eq!(items.len(), 4);
        assert!(items[0].done);
        assert!(!items[1].done);
        assert!(!items[2].done);
        assert_eq!(items[3].href, "http://localhost:3000/shop/tech-store");
    }

    #[test]
    fn test_checklist_tracks_progress() {
        let mut shop = shop();
        shop.logo_url = Some("/media/logo.png".to_string());
        let stats = OrderStats {
            total_products: 3,
            total_orders: 1,
            ..OrderStats::default()
        };
        let items = checklist(&shop, &stats, "");
        assert!(items.iter().all(|item| item.done));
    }
}
