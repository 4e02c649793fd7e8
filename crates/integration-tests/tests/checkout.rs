//! Checkout stock end-to-end tests.
//!
//! Each test signs up its own shop so the seeded stock is left alone.
//! Require both servers. Run with
//! `cargo test -p converty-integration-tests -- --ignored`.

use converty_integration_tests::{
    client, create_product, find_link, sign_up_fresh_shop, storefront_url,
};
use reqwest::{Client, StatusCode};

/// Create a published product in a fresh shop and return its storefront URL.
async fn stocked_product(name: &str, quantity: i32) -> String {
    let merchant = client();
    let shop_path = sign_up_fresh_shop(&merchant).await;
    create_product(&merchant, name, "15.00", quantity).await;

    let base = storefront_url();
    let shop = client()
        .get(format!("{base}{shop_path}"))
        .send()
        .await
        .expect("Failed to reach storefront")
        .text()
        .await
        .expect("body");
    let product_path = find_link(&shop, &format!("{shop_path}/product/"))
        .expect("product link on shop page")
        .to_string();
    format!("{base}{product_path}")
}

async fn submit_checkout(client: &Client, product_url: &str, quantity: i32) -> reqwest::Response {
    let quantity = quantity.to_string();
    client
        .post(format!("{product_url}/checkout"))
        .form(&[
            ("customer_name", "Stock Buyer"),
            ("customer_phone", "+1 555 0199"),
            ("customer_city", "Shelbyville"),
            ("customer_address", "19 Plank Street"),
            ("customer_notes", ""),
            ("quantity", quantity.as_str()),
        ])
        .send()
        .await
        .expect("Failed to submit checkout")
}

async fn stock_text(product_url: &str) -> String {
    let body = client()
        .get(product_url)
        .send()
        .await
        .expect("Failed to load product")
        .text()
        .await
        .expect("body");
    let start = body.find("class=\"stock").expect("stock label");
    let rest = body.get(start..).unwrap_or_default();
    let open = rest.find('>').map_or(0, |i| i + 1);
    let close = rest.find("</p>").unwrap_or(rest.len());
    rest.get(open..close).unwrap_or_default().trim().to_string()
}

#[tokio::test]
#[ignore = "Requires running dashboard and storefront"]
async fn test_quantity_above_stock_is_rejected() {
    let name = format!("Canvas Tote {}", uuid::Uuid::new_v4().simple());
    let product_url = stocked_product(&name, 2).await;
    assert_eq!(stock_text(&product_url).await, "Only 2 left");

    let resp = submit_checkout(&client(), &product_url, 5).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.expect("body").contains("Only 2 left in stock."));

    assert_eq!(stock_text(&product_url).await, "Only 2 left");
}

#[tokio::test]
#[ignore = "Requires running dashboard and storefront"]
async fn test_concurrent_checkouts_never_oversell() {
    const STOCK: i32 = 2;

    let name = format!("Enamel Pin {}", uuid::Uuid::new_v4().simple());
    let product_url = stocked_product(&name, STOCK).await;

    let attempts: Vec<_> = (0..6)
        .map(|_| {
            let product_url = product_url.clone();
            tokio::spawn(async move {
                submit_checkout(&client(), &product_url, 1).await.status()
            })
        })
        .collect();

    let mut placed = 0;
    for attempt in attempts {
        let status = attempt.await.expect("checkout task");
        if status == StatusCode::OK {
            placed += 1;
        } else {
            // Buyers over the rate limit get 429; everyone else sees the stock error.
            assert!(
                status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::TOO_MANY_REQUESTS,
                "unexpected checkout status {status}"
            );
        }
    }
    assert!(placed <= STOCK, "{placed} orders placed for {STOCK} units");

    let expected = match STOCK - placed {
        0 => "Out of stock".to_string(),
        left => format!("Only {left} left"),
    };
    assert_eq!(stock_text(&product_url).await, expected);
}
