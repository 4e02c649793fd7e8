//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                           - Landing page
//! GET  /shop/{slug}?category=&q=                   - Shop catalog
//! GET  /shop/{slug}/product/{product_id}           - Product detail
//! GET  /shop/{slug}/product/{product_id}/checkout  - Checkout form
//! POST /shop/{slug}/product/{product_id}/checkout  - Place order (rate limited)
//! ```
//!
//! Every shop page is themed with the shop's colours, font and logo, and
//! carries the shop's Facebook Pixel when one is configured.

pub mod checkout;
pub mod home;
pub mod product;
pub mod shop;

use axum::{
    Router,
    routing::{get, post},
};

use converty_core::{PixelEvent, ProductId, Slug};

use crate::db::StorefrontRepository;
use crate::error::{AppError, Result};
use crate::middleware::{CspNonce, checkout_rate_limiter};
use crate::models::Shop;
use crate::services::pixel::{EventPayload, PixelSnippet, pixel_for_shop};
use crate::state::AppState;

/// Header, footer and theme of a shop page.
#[derive(Debug, Clone)]
pub struct ShopChrome {
    pub name: String,
    pub url: String,
    pub logo_url: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    /// `:root` custom properties. Built from validated colours and fixed font stacks only.
    pub theme_css: String,
}

impl From<&Shop> for ShopChrome {
    fn from(shop: &Shop) -> Self {
        Self {
            name: shop.name.clone(),
            url: shop.url(),
            logo_url: shop.logo_url.clone(),
            contact_email: shop.contact_email.clone(),
            contact_phone: shop.contact_phone.clone(),
            address: shop.address.clone(),
            theme_css: theme_css(shop),
        }
    }
}

fn theme_css(shop: &Shop) -> String {
    format!(
        ":root{{--color-primary:{};--color-secondary:{};--color-accent:{};--font-body:{};}}",
        shop.primary_color.as_str(),
        shop.secondary_color.as_str(),
        shop.accent_color.as_str(),
        shop.font_family.css_stack(),
    )
}

/// Data every page template receives.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub title: String,
    pub nonce: String,
    pub dashboard_url: String,
    pub shop: Option<ShopChrome>,
    /// Inline pixel code, when the shop tracks with a Facebook Pixel.
    pub pixel_script: Option<String>,
}

impl PageContext {
    /// Context for pages outside any shop.
    #[must_use]
    pub fn platform(state: &AppState, nonce: &CspNonce, title: &str) -> Self {
        Self {
            title: title.to_string(),
            nonce: nonce.value().to_string(),
            dashboard_url: state.config().dashboard_url.clone(),
            shop: None,
            pixel_script: None,
        }
    }

    /// Context for a shop page. `PageView` is always tracked; `event` adds
    /// the funnel event the page represents.
    #[must_use]
    pub fn for_shop(
        state: &AppState,
        nonce: &CspNonce,
        shop: &Shop,
        title: &str,
        event: Option<(PixelEvent, EventPayload)>,
    ) -> Self {
        let pixel_script = pixel_for_shop(shop.facebook_pixel_id.as_deref()).map(|pixel| {
            let snippet = PixelSnippet::new(pixel);
            match event {
                Some((event, payload)) => snippet.with_event(event, payload),
                None => snippet,
            }
            .inline_script()
        });

        Self {
            title: format!("{title} | {}", shop.name),
            nonce: nonce.value().to_string(),
            dashboard_url: state.config().dashboard_url.clone(),
            shop: Some(ShopChrome::from(shop)),
            pixel_script,
        }
    }
}

/// Look up a shop by its URL slug. Malformed and unknown slugs are both 404.
pub(crate) async fn load_shop(state: &AppState, slug: &str) -> Result<Shop> {
    let parsed = Slug::parse(slug).map_err(|_| AppError::NotFound(format!("shop {slug}")))?;
    StorefrontRepository::new(state.pool())
        .shop_by_slug(&parsed)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shop {slug}")))
}

/// Parse a product id path segment; malformed ids are 404 like unknown ones.
pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse::<ProductId>()
        .map_err(|_| AppError::NotFound(format!("product {raw}")))
}

/// Create all routes for the storefront. Only checkout posts are rate limited.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::landing))
        .route("/shop/{slug}", get(shop::index))
        .route("/shop/{slug}/product/{product_id}", get(product::show))
        .route(
            "/shop/{slug}/product/{product_id}/checkout",
            get(checkout::show).merge(post(checkout::submit).layer(checkout_rate_limiter())),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use converty_core::{CurrencyCode, FontFamily, HexColor, ShopId};

    use super::*;

    pub(crate) fn shop() -> Shop {
        Shop {
            id: ShopId::generate(),
            name: "Tech Store".to_string(),
            slug: Slug::parse("tech-store").unwrap(),
            description: Some("Gadgets".to_string()),
            contact_email: None,
            contact_phone: None,
            address: None,
            store_currency: CurrencyCode::USD,
            facebook_pixel_id: None,
            logo_url: None,
            banner_url: None,
            primary_color: HexColor::parse("#112233").unwrap(),
            secondary_color: HexColor::parse("#445566").unwrap(),
            accent_color: HexColor::parse("#778899").unwrap(),
            font_family: FontFamily::Serif,
        }
    }

    #[test]
    fn test_theme_css() {
        let css = theme_css(&shop());
        assert!(css.starts_with(":root{--color-primary:#112233;"));
        assert!(css.contains("--color-accent:#778899;"));
        assert!(css.contains("--font-body:ui-serif,"));
    }

    #[test]
    fn test_parse_product_id() {
        assert!(parse_product_id("not-a-uuid").is_err());
        let id = ProductId::generate();
        assert_eq!(parse_product_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_shop_chrome_url() {
        assert_eq!(ShopChrome::from(&shop()).url, "/shop/tech-store");
    }

    mod router {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use axum::middleware::from_fn;
        use sqlx::postgres::PgPoolOptions;
        use tower::ServiceExt;

        use crate::config::tests::test_config;
        use crate::middleware::csp_nonce_middleware;

        use super::*;

        /// Router over a lazy pool; requests that reach the database fail.
        fn app() -> Router {
            let pool = PgPoolOptions::new()
                .connect_lazy("postgres://localhost/converty")
                .unwrap();
            routes()
                .layer(from_fn(csp_nonce_middleware))
                .with_state(AppState::new(test_config(), pool))
        }

        async fn body_text(response: axum::response::Response) -> String {
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            String::from_utf8(bytes.to_vec()).unwrap()
        }

        #[tokio::test]
        async fn test_landing_links_to_dashboard() {
            let response = app()
                .oneshot(Request::get("/").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let html = body_text(response).await;
            assert!(html.contains("http://localhost:3001/auth/signup"));
            assert!(html.contains("http://localhost:3001/auth/login"));
        }

        #[tokio::test]
        async fn test_malformed_slug_is_not_found() {
            let response = app()
                .oneshot(Request::get("/shop/bad--slug").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert!(body_text(response).await.contains("Page not found"));
        }
    }
}
