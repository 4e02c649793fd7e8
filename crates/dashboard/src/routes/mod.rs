//! HTTP route handlers for the merchant dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Redirect to /dashboard
//!
//! # Auth
//! GET  /auth/login                         - Login page
//! POST /auth/login                         - Login action (rate limited)
//! GET  /auth/signup                        - Sign-up page
//! POST /auth/signup                        - Sign-up action (rate limited)
//! POST /auth/logout                        - Logout
//!
//! # Dashboard (requires a merchant session)
//! GET  /dashboard                          - Overview
//! GET  /dashboard/products                 - Product list
//! GET  /dashboard/products/new             - New product form
//! POST /dashboard/products/new             - Create product (multipart)
//! GET  /dashboard/products/{id}            - Edit product form
//! POST /dashboard/products/{id}            - Update product (multipart)
//! POST /dashboard/products/{id}/delete     - Delete product and its images
//! POST /dashboard/products/{id}/images/{image_id}/delete - Delete one image
//! GET  /dashboard/categories               - Category list
//! POST /dashboard/categories               - Quick add
//! GET  /dashboard/categories/{id}          - Edit category form
//! POST /dashboard/categories/{id}          - Update category
//! POST /dashboard/categories/{id}/delete   - Delete category
//! GET  /dashboard/orders?status=           - Order list
//! GET  /dashboard/orders/new               - Manual order builder
//! POST /dashboard/orders/new               - Create manual order
//! POST /dashboard/orders/new/items         - Add draft line
//! POST /dashboard/orders/new/items/{product_id}/remove - Remove draft line
//! GET  /dashboard/orders/{id}              - Order detail
//! POST /dashboard/orders/{id}/status       - Change status
//! POST /dashboard/orders/{id}/delete       - Delete order
//! GET  /dashboard/settings                 - Settings page
//! POST /dashboard/settings                 - Update general settings
//! POST /dashboard/settings/integrations    - Update Facebook Pixel ID
//! GET  /dashboard/theme                    - Theme editor
//! POST /dashboard/theme                    - Update theme (multipart)
//! GET  /dashboard/team                     - Team members
//! POST /dashboard/team/invite              - Invite member
//! POST /dashboard/team/{id}/remove         - Remove member
//! GET  /dashboard/billing                  - Plan and billing history
//! POST /dashboard/billing/upgrade          - Plan change request
//! ```
//!
//! Form posts follow post/redirect/get and report their outcome through
//! `?success=` / `?error=` query parameters rendered by each page.

pub mod auth;
pub mod billing;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod settings;
pub mod team;
pub mod theme;

use askama::Template;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::limit::RequestBodyLimitLayer;

use crate::middleware::{ShopSession, auth_rate_limiter};
use crate::state::AppState;

/// Most images accepted in one product form post.
pub const MAX_IMAGES_PER_UPLOAD: usize = 10;

/// Body limit for multipart posts: a full batch of images plus 1 MiB of form fields.
#[must_use]
pub const fn upload_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes
        .saturating_mul(MAX_IMAGES_PER_UPLOAD)
        .saturating_add(1024 * 1024)
}

/// Flash message query parameters shared by every page.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Redirect to `path` with a success message.
#[must_use]
pub fn redirect_success(path: &str, message: &str) -> Response {
    redirect_flash(path, "success", message)
}

/// Redirect to `path` with an error message.
#[must_use]
pub fn redirect_error(path: &str, message: &str) -> Response {
    redirect_flash(path, "error", message)
}

fn redirect_flash(path: &str, key: &str, message: &str) -> Response {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{path}{separator}{key}={}",
        urlencoding::encode(message)
    ))
    .into_response()
}

/// Render a template into an HTML response.
pub(crate) fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template render error: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Page chrome shared by all dashboard templates.
#[derive(Debug, Clone)]
pub struct ShellView {
    pub merchant_email: String,
    pub shop_name: String,
    pub shop_url: String,
    pub current_path: String,
}

impl ShellView {
    #[must_use]
    pub fn new(state: &AppState, session: &ShopSession, current_path: &str) -> Self {
        Self {
            merchant_email: session.merchant.email.to_string(),
            shop_name: session.shop.name.clone(),
            shop_url: state.config().shop_url(session.shop.slug.as_str()),
            current_path: current_path.to_string(),
        }
    }

    /// Whether a navigation entry is the active one.
    #[must_use]
    pub fn is_active(&self, href: &str) -> bool {
        if href == "/dashboard" {
            self.current_path == href
        } else {
            self.current_path.starts_with(href)
        }
    }
}

/// Authentication routes. Only the form posts are rate limited.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).post(auth::login).layer(auth_rate_limiter()),
        )
        .route(
            "/signup",
            get(auth::signup_page)
                .post(auth::signup)
                .layer(auth_rate_limiter()),
        )
        .route("/logout", post(auth::logout))
}

/// Dashboard routes. `upload_limit` bounds multipart request bodies.
pub fn dashboard_routes(upload_limit: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route(
            "/products/new",
            get(products::new_product).post(products::create),
        )
        .route("/products/{id}", get(products::edit).post(products::update))
        .route("/theme", get(theme::show).post(theme::update))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_limit));

    Router::new()
        .route("/", get(dashboard::overview))
        .route("/products", get(products::index))
        .route("/products/{id}/delete", post(products::delete))
        .route(
            "/products/{id}/images/{image_id}/delete",
            post(products::delete_image),
        )
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::edit).post(categories::update),
        )
        .route("/categories/{id}/delete", post(categories::delete))
        .route("/orders", get(orders::index))
        .route("/orders/new", get(orders::new_order).post(orders::create))
        .route("/orders/new/items", post(orders::add_item))
        .route(
            "/orders/new/items/{product_id}/remove",
            post(orders::remove_item),
        )
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/orders/{id}/delete", post(orders::delete))
        .route("/settings", get(settings::show).post(settings::update))
        .route("/settings/integrations", post(settings::update_integrations))
        .route("/team", get(team::index))
        .route("/team/invite", post(team::invite))
        .route("/team/{id}/remove", post(team::remove))
        .route("/billing", get(billing::show))
        .route("/billing/upgrade", post(billing::upgrade))
        .merge(uploads)
}

/// Create all routes for the dashboard.
pub fn routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .nest("/auth", auth_routes())
        .nest("/dashboard", dashboard_routes(upload_limit))
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn test_redirect_flash_encodes_message() {
        let response = redirect_success("/dashboard/products", "Product created");
        assert_eq!(
            location(&response),
            "/dashboard/products?success=Product%20created"
        );

        let response = redirect_error("/dashboard/orders?status=pending", "Order not found");
        assert_eq!(
            location(&response),
            "/dashboard/orders?status=pending&error=Order%20not%20found"
        );
    }

    #[test]
    fn test_shell_active_navigation() {
        let shell = ShellView {
            merchant_email: "m@example.com".to_string(),
            shop_name: "Tech Store".to_string(),
            shop_url: "http://localhost:3000/shop/tech-store".to_string(),
            current_path: "/dashboard/products/new".to_string(),
        };
        assert!(shell.is_active("/dashboard/products"));
        assert!(!shell.is_active("/dashboard"));
        assert!(!shell.is_active("/dashboard/orders"));
    }

    #[test]
    fn test_upload_body_limit_covers_full_batch() {
        let limit = upload_body_limit(5 * 1024 * 1024);
        assert!(limit > 5 * 1024 * 1024 * MAX_IMAGES_PER_UPLOAD);
        assert_eq!(upload_body_limit(usize::MAX), usize::MAX);
    }
}
