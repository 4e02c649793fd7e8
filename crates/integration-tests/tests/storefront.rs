//! Storefront end-to-end tests.
//!
//! Require a seeded database and a running storefront. Run with
//! `cargo test -p converty-integration-tests -- --ignored`.

use converty_integration_tests::{SEEDED_SHOP_SLUG, client, find_link, storefront_url};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", storefront_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_landing_page_links_to_signup() {
    let resp = client()
        .get(storefront_url())
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);

    let csp = resp
        .headers()
        .get("content-security-policy")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(csp.contains("nonce-"), "CSP missing nonce: {csp}");

    let body = resp.text().await.expect("body");
    assert!(body.contains("/auth/signup"));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_unknown_shop_is_404() {
    let resp = client()
        .get(format!("{}/shop/no-such-shop-{}", storefront_url(), uuid::Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.expect("body").contains("Page not found"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded data"]
async fn test_shop_lists_only_published_products() {
    let resp = client()
        .get(format!("{}/shop/{SEEDED_SHOP_SLUG}", storefront_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(body.contains("Wireless Headphones"));
    assert!(!body.contains("Mechanical Keyboard"), "draft product listed");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded data"]
async fn test_search_filters_products() {
    let resp = client()
        .get(format!("{}/shop/{SEEDED_SHOP_SLUG}?q=watch", storefront_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(body.contains("Smart Watch"));
    assert!(!body.contains("USB-C Charging Cable"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded data"]
async fn test_checkout_places_order() {
    let client = client();
    let base = storefront_url();
    let shop = client
        .get(format!("{base}/shop/{SEEDED_SHOP_SLUG}?q=headphones"))
        .send()
        .await
        .expect("Failed to reach storefront")
        .text()
        .await
        .expect("body");
    let product_path = find_link(&shop, &format!("/shop/{SEEDED_SHOP_SLUG}/product/"))
        .expect("product link on shop page")
        .to_string();

    let checkout_url = format!("{base}{product_path}/checkout");
    let resp = client
        .get(&checkout_url)
        .send()
        .await
        .expect("Failed to load checkout");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(&checkout_url)
        .form(&[
            ("customer_name", "Integration Buyer"),
            ("customer_phone", "+1 555 0142"),
            ("customer_city", "Springfield"),
            ("customer_address", "742 Evergreen Terrace"),
            ("customer_notes", ""),
            ("quantity", "1"),
        ])
        .send()
        .await
        .expect("Failed to submit checkout");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Thank you, Integration Buyer!"));
    assert!(body.contains("Wireless Headphones"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded data"]
async fn test_checkout_requires_contact_fields() {
    let client = client();
    let base = storefront_url();
    let shop = client
        .get(format!("{base}/shop/{SEEDED_SHOP_SLUG}"))
        .send()
        .await
        .expect("Failed to reach storefront")
        .text()
        .await
        .expect("body");
    let product_path = find_link(&shop, &format!("/shop/{SEEDED_SHOP_SLUG}/product/"))
        .expect("product link on shop page")
        .to_string();

    let resp = client
        .post(format!("{base}{product_path}/checkout"))
        .form(&[("customer_name", "No Phone"), ("quantity", "1")])
        .send()
        .await
        .expect("Failed to submit checkout");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.expect("body").contains("Please fill in"));
}
