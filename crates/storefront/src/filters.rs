//! Askama filters for storefront templates.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Year for the page footer: `{{ ""|current_year }}`.
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Cache-busting token for `/static` assets, computed by `build.rs` from
/// `main.css` and `storefront.js`: `?v={{ ""|asset_hash }}`.
#[askama::filter_fn]
pub fn asset_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("ASSET_HASH"))
}

/// Stock line under the buy button: `{{ product.quantity|stock_label }}`.
#[askama::filter_fn]
pub fn stock_label(
    quantity: impl std::borrow::Borrow<i32>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(stock_text(*quantity.borrow()))
}

/// At or below this, the exact remaining count is shown as "Only N left".
const LOW_STOCK: i32 = 5;

fn stock_text(quantity: i32) -> String {
    match quantity {
        q if q <= 0 => "Out of stock".to_string(),
        1 => "Only 1 left".to_string(),
        q if q <= LOW_STOCK => format!("Only {q} left"),
        q => format!("{q} in stock"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_text() {
        assert_eq!(stock_text(0), "Out of stock");
        assert_eq!(stock_text(-2), "Out of stock");
        assert_eq!(stock_text(1), "Only 1 left");
        assert_eq!(stock_text(5), "Only 5 left");
        assert_eq!(stock_text(50), "50 in stock");
    }
}
