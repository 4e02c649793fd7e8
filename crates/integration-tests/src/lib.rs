//! Helpers for end-to-end tests against running Converty servers.
//!
//! The tests under `tests/` are `#[ignore]`d by default. They expect a
//! migrated and seeded database with both servers up:
//!
//! ```bash
//! cargo run -p converty-cli -- migrate
//! cargo run -p converty-cli -- seed
//! cargo run -p converty-storefront &
//! cargo run -p converty-dashboard &
//! cargo test -p converty-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;

/// Shop created by `converty seed`.
pub const SEEDED_SHOP_SLUG: &str = "tech-store";

/// Merchant created by `converty seed`.
pub const SEEDED_MERCHANT_EMAIL: &str = "merchant1@test.com";

/// Password of every seeded merchant.
pub const SEEDED_PASSWORD: &str = "TestPassword123!";

/// Base URL of the storefront (`STOREFRONT_BASE_URL`, default port 3000).
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the dashboard (`DASHBOARD_BASE_URL`, default port 3001).
#[must_use]
pub fn dashboard_url() -> String {
    std::env::var("DASHBOARD_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Client that keeps cookies and does not follow redirects, so tests can
/// assert on `Location` headers.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Extract the first `href` that starts with `prefix` from an HTML body.
#[must_use]
pub fn find_link<'a>(html: &'a str, prefix: &str) -> Option<&'a str> {
    let needle = format!("href=\"{prefix}");
    let start = html.find(&needle)? + "href=\"".len();
    let rest = html.get(start..)?;
    let end = rest.find('"')?;
    rest.get(..end)
}

/// Sign up a new merchant on `client`, leaving it logged in.
///
/// Returns the storefront path of the merchant's shop (`/shop/{slug}`).
///
/// # Panics
///
/// Panics if the dashboard rejects the signup.
#[allow(clippy::expect_used)]
pub async fn sign_up_fresh_shop(client: &Client) -> String {
    let email = format!("it-{}@example.com", uuid::Uuid::new_v4().simple());
    let resp = client
        .post(format!("{}/auth/signup", dashboard_url()))
        .form(&[
            ("email", email.as_str()),
            ("password", SEEDED_PASSWORD),
            ("password_confirm", SEEDED_PASSWORD),
            ("shop_name", "Integration Shop"),
        ])
        .send()
        .await
        .expect("Failed to sign up");
    assert!(resp.status().is_redirection(), "signup failed: {}", resp.status());

    let home = client
        .get(format!("{}/dashboard", dashboard_url()))
        .send()
        .await
        .expect("Failed to load dashboard")
        .text()
        .await
        .expect("body");
    let storefront = storefront_url();
    let shop_url = find_link(&home, &format!("{storefront}/shop/")).expect("storefront link");
    shop_url
        .strip_prefix(storefront.as_str())
        .expect("storefront prefix")
        .to_string()
}

/// Create a published product through the dashboard's product form.
///
/// # Panics
///
/// Panics if the dashboard does not accept the product.
#[allow(clippy::expect_used)]
pub async fn create_product(client: &Client, name: &str, price: &str, quantity: i32) {
    let form = reqwest::multipart::Form::new()
        .text("name", name.to_string())
        .text("description", "Created by the end-to-end tests")
        .text("price", price.to_string())
        .text("compare_at_price", "")
        .text("sku", "")
        .text("quantity", quantity.to_string())
        .text("category_id", "")
        .text("status", "published");
    let resp = client
        .post(format!("{}/dashboard/products/new", dashboard_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to submit product");
    assert!(resp.status().is_redirection(), "product rejected: {}", resp.status());
    let location = resp
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        location.starts_with("/dashboard/products?success="),
        "product rejected: {location}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_link() {
        let html = r#"<a href="/shop/tech-store">Shop</a>
            <a href="/shop/tech-store/product/abc">Product</a>"#;
        assert_eq!(
            find_link(html, "/shop/tech-store/product/"),
            Some("/shop/tech-store/product/abc")
        );
        assert_eq!(find_link(html, "/dashboard"), None);
    }
}
