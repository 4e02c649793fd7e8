//! Dashboard end-to-end tests.
//!
//! Require a seeded database and a running dashboard. Run with
//! `cargo test -p converty-integration-tests -- --ignored`.

use converty_integration_tests::{
    SEEDED_MERCHANT_EMAIL, SEEDED_PASSWORD, client, create_product, dashboard_url,
    sign_up_fresh_shop,
};
use reqwest::{Client, StatusCode, header::LOCATION};

fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn logged_in_client() -> Client {
    let client = client();
    let resp = client
        .post(format!("{}/auth/login", dashboard_url()))
        .form(&[("email", SEEDED_MERCHANT_EMAIL), ("password", SEEDED_PASSWORD)])
        .send()
        .await
        .expect("Failed to log in");
    assert!(resp.status().is_redirection(), "login failed: {}", resp.status());
    assert_eq!(location(&resp), "/dashboard");
    client
}

#[tokio::test]
#[ignore = "Requires running dashboard"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", dashboard_url()))
        .send()
        .await
        .expect("Failed to reach dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running dashboard"]
async fn test_dashboard_requires_login() {
    let resp = client()
        .get(format!("{}/dashboard/products", dashboard_url()))
        .send()
        .await
        .expect("Failed to reach dashboard");
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
#[ignore = "Requires running dashboard"]
async fn test_wrong_password_is_rejected() {
    let resp = client()
        .post(format!("{}/auth/login", dashboard_url()))
        .form(&[("email", SEEDED_MERCHANT_EMAIL), ("password", "not-the-password")])
        .send()
        .await
        .expect("Failed to reach dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("Invalid email or password"));
}

#[tokio::test]
#[ignore = "Requires running dashboard and seeded data"]
async fn test_merchant_sees_own_products() {
    let client = logged_in_client().await;
    let resp = client
        .get(format!("{}/dashboard/products", dashboard_url()))
        .send()
        .await
        .expect("Failed to load products");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(body.contains("Wireless Headphones"));
    assert!(!body.contains("Denim Jacket"), "another shop's product leaked");
}

#[tokio::test]
#[ignore = "Requires running dashboard"]
async fn test_signup_creates_shop() {
    let email = format!("it-{}@example.com", uuid::Uuid::new_v4().simple());
    let resp = client()
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
    assert!(resp.status().is_redirection());
    assert!(location(&resp).starts_with("/dashboard?success="));
}

#[tokio::test]
#[ignore = "Requires running dashboard and storefront"]
async fn test_created_product_listed_once() {
    let client = client();
    sign_up_fresh_shop(&client).await;
    let name = format!("Desk Lamp {}", uuid::Uuid::new_v4().simple());
    create_product(&client, &name, "34.50", 12).await;

    let body = client
        .get(format!("{}/dashboard/products", dashboard_url()))
        .send()
        .await
        .expect("Failed to load products")
        .text()
        .await
        .expect("body");
    assert_eq!(body.matches(&format!(">{name}</a>")).count(), 1, "product listed more than once");
}
