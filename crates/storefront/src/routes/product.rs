//! Product detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use converty_core::PixelEvent;

use crate::db::StorefrontRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{Product, ProductImage, Shop};
use crate::services::pixel::EventPayload;
use crate::state::AppState;

use super::{PageContext, load_shop, parse_product_id};

#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub in_stock: bool,
    pub quantity: i32,
}

impl ProductDetail {
    #[must_use]
    pub fn new(shop: &Shop, product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category_name.clone(),
            price: shop.format_price(product.price),
            compare_at_price: product.sale_reference().map(|p| shop.format_price(p)),
            in_stock: product.in_stock(),
            quantity: product.quantity,
        }
    }
}

/// Gallery images in order, or the product's main image when it has no gallery.
fn gallery(product: &Product, images: &[ProductImage]) -> Vec<String> {
    if images.is_empty() {
        product.image_url.iter().cloned().collect()
    } else {
        images.iter().map(|i| i.image_url.clone()).collect()
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/product.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub shop_url: String,
    pub canonical_url: String,
    pub product: ProductDetail,
    pub images: Vec<String>,
    pub checkout_url: String,
    /// `AddToCart` payload fired by `storefront.js` when the buy button is clicked.
    pub add_to_cart_payload: String,
}

/// GET /shop/{slug}/product/{product_id}
#[instrument(skip(state, nonce), fields(shop_id))]
pub async fn show(
    State(state): State<AppState>,
    nonce: CspNonce,
    Path((slug, product_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let shop = load_shop(&state, &slug).await?;
    tracing::Span::current().record("shop_id", tracing::field::display(shop.id));
    let product_id = parse_product_id(&product_id)?;

    let repo = StorefrontRepository::new(state.pool());
    let product = repo
        .published_product(shop.id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
    let images = repo.product_images(product.id).await?;

    add_breadcrumb(
        "navigation",
        "Viewed product",
        &[("product_id", &product.id.to_string())],
    );

    let payload =
        EventPayload::product(product.id, &product.name, product.price, shop.store_currency);
    let product_url = format!("{}/product/{}", shop.url(), product.id);

    Ok(ProductTemplate {
        page: PageContext::for_shop(
            &state,
            &nonce,
            &shop,
            &product.name,
            Some((PixelEvent::ViewContent, payload.clone())),
        ),
        shop_url: shop.url(),
        canonical_url: state.config().absolute_url(&product_url),
        product: ProductDetail::new(&shop, &product),
        images: gallery(&product, &images),
        checkout_url: format!("{product_url}/checkout"),
        add_to_cart_payload: payload.with_items(1).to_script_json(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use converty_core::{ProductId, ProductImageId};

    use super::*;

    fn product(image_url: Option<&str>) -> Product {
        Product {
            id: ProductId::generate(),
            category_id: None,
            category_name: Some("Audio".to_string()),
            name: "Wireless Headphones".to_string(),
            description: "Noise cancelling".to_string(),
            price: Decimal::new(7999, 2),
            compare_at_price: Some(Decimal::new(9999, 2)),
            quantity: 3,
            image_url: image_url.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn image(url: &str, sort_order: i32) -> ProductImage {
        ProductImage {
            id: ProductImageId::generate(),
            image_url: url.to_string(),
            sort_order,
        }
    }

    #[test]
    fn test_gallery_prefers_images() {
        let p = product(Some("/media/main.png"));
        let images = [image("/media/a.png", 0), image("/media/b.png", 1)];
        assert_eq!(gallery(&p, &images), vec!["/media/a.png", "/media/b.png"]);
    }

    #[test]
    fn test_gallery_falls_back_to_main_image() {
        assert_eq!(gallery(&product(Some("/media/main.png")), &[]), vec!["/media/main.png"]);
        assert!(gallery(&product(None), &[]).is_empty());
    }

    #[test]
    fn test_detail_formats_prices() {
        let shop = crate::routes::tests::shop();
        let detail = ProductDetail::new(&shop, &product(None));
        assert_eq!(detail.price, "$79.99");
        assert_eq!(detail.compare_at_price.as_deref(), Some("$99.99"));
        assert!(detail.in_stock);
    }
}
