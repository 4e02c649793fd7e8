//! Single-product cash-on-delivery checkout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use converty_core::{OrderId, PixelEvent};

use crate::db::StorefrontRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{PlacedOrder, Product, Shop};
use crate::services::checkout::{self, CheckoutError, CheckoutForm};
use crate::services::pixel::EventPayload;
use crate::state::AppState;

use super::product::ProductDetail;
use super::{PageContext, load_shop, parse_product_id};

/// How a shop's currency wraps an amount, for the live total in `storefront.js`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub prefix: String,
    pub suffix: String,
}

impl CurrencyFormat {
    #[must_use]
    pub fn for_shop(shop: &Shop) -> Self {
        match shop.store_currency.symbol() {
            Some(symbol) => Self {
                prefix: symbol.to_string(),
                suffix: String::new(),
            },
            None => Self {
                prefix: String::new(),
                suffix: format!(" {}", shop.store_currency.code()),
            },
        }
    }
}

/// Short order reference shown to the buyer.
#[must_use]
pub fn order_reference(order_id: OrderId) -> String {
    order_id
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_ascii_uppercase()
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub product_url: String,
    pub product: ProductDetail,
    pub image_url: Option<String>,
    pub form: CheckoutForm,
    pub quantity: i32,
    pub unit_price: String,
    pub currency: CurrencyFormat,
    pub total: String,
    pub error: Option<String>,
}

impl CheckoutTemplate {
    fn new(
        page: PageContext,
        shop: &Shop,
        product: &Product,
        form: CheckoutForm,
        error: Option<String>,
    ) -> Self {
        let quantity = form.quantity().min(product.quantity.max(1));
        Self {
            page,
            product_url: format!("{}/product/{}", shop.url(), product.id),
            product: ProductDetail::new(shop, product),
            image_url: product.image_url.clone(),
            quantity,
            unit_price: product.price.round_dp(2).to_string(),
            currency: CurrencyFormat::for_shop(shop),
            total: shop.format_price(product.price * rust_decimal::Decimal::from(quantity)),
            form,
            error,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/confirmation.html")]
pub struct ConfirmationTemplate {
    pub page: PageContext,
    pub shop_url: String,
    pub reference: String,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub total: String,
}

async fn load_product(state: &AppState, shop: &Shop, raw_id: &str) -> Result<Product> {
    let product_id = parse_product_id(raw_id)?;
    StorefrontRepository::new(state.pool())
        .published_product(shop.id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))
}

/// GET /shop/{slug}/product/{product_id}/checkout
#[instrument(skip(state, nonce), fields(shop_id))]
pub async fn show(
    State(state): State<AppState>,
    nonce: CspNonce,
    Path((slug, product_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let shop = load_shop(&state, &slug).await?;
    tracing::Span::current().record("shop_id", tracing::field::display(shop.id));
    let product = load_product(&state, &shop, &product_id).await?;

    let page = PageContext::for_shop(&state, &nonce, &shop, "Checkout", None);
    Ok(CheckoutTemplate::new(
        page,
        &shop,
        &product,
        CheckoutForm::default(),
        None,
    ))
}

/// POST /shop/{slug}/product/{product_id}/checkout
///
/// Buyer mistakes and stock shortfalls re-render the form with a message;
/// a placed order renders the confirmation and fires `Purchase`.
#[instrument(skip(state, nonce, form), fields(shop_id, order_id))]
pub async fn submit(
    State(state): State<AppState>,
    nonce: CspNonce,
    Path((slug, product_id)): Path<(String, String)>,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let shop = load_shop(&state, &slug).await?;
    tracing::Span::current().record("shop_id", tracing::field::display(shop.id));
    let product = load_product(&state, &shop, &product_id).await?;

    match checkout::place_order(state.pool(), shop.id, &product, &form).await {
        Ok(placed) => {
            tracing::Span::current().record("order_id", tracing::field::display(placed.order_id));
            add_breadcrumb(
                "checkout",
                "Order placed",
                &[("order_id", &placed.order_id.to_string())],
            );
            Ok(confirmation(&state, &nonce, &shop, &product, &form, &placed).into_response())
        }
        Err(CheckoutError::Invalid(message)) => {
            tracing::debug!(%message, "Checkout rejected");
            // Stock may have moved since the page was loaded.
            let product = load_product(&state, &shop, &product_id)
                .await
                .unwrap_or(product);
            let page = PageContext::for_shop(&state, &nonce, &shop, "Checkout", None);
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutTemplate::new(page, &shop, &product, form, Some(message)),
            )
                .into_response())
        }
        Err(CheckoutError::Repository(e)) => Err(e.into()),
    }
}

fn confirmation(
    state: &AppState,
    nonce: &CspNonce,
    shop: &Shop,
    product: &Product,
    form: &CheckoutForm,
    placed: &PlacedOrder,
) -> ConfirmationTemplate {
    let purchase = EventPayload::product(
        product.id,
        &placed.product_name,
        placed.total,
        shop.store_currency,
    )
    .with_items(placed.quantity);

    ConfirmationTemplate {
        page: PageContext::for_shop(
            state,
            nonce,
            shop,
            "Order confirmed",
            Some((PixelEvent::Purchase, purchase)),
        ),
        shop_url: shop.url(),
        reference: order_reference(placed.order_id),
        customer_name: form.customer_name.trim().to_string(),
        product_name: placed.product_name.clone(),
        quantity: placed.quantity,
        unit_price: shop.format_price(placed.unit_price),
        total: shop.format_price(placed.total),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use converty_core::CurrencyCode;

    use super::*;

    #[test]
    fn test_currency_format() {
        let mut shop = crate::routes::tests::shop();
        assert_eq!(
            CurrencyFormat::for_shop(&shop),
            CurrencyFormat {
                prefix: "$".to_string(),
                suffix: String::new()
            }
        );

        shop.store_currency = CurrencyCode::TND;
        assert_eq!(CurrencyFormat::for_shop(&shop).suffix, " TND");
    }

    #[test]
    fn test_order_reference() {
        let id: OrderId = "0a1b2c3d-0000-4000-8000-000000000000".parse().unwrap();
        assert_eq!(order_reference(id), "0A1B2C3D");
    }
}
