//! Shop catalog page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use converty_core::CategoryId;

use crate::db::StorefrontRepository;
use crate::db::storefront::ProductFilter;
use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{Category, Product, Shop};
use crate::state::AppState;

use super::{PageContext, load_shop};

#[derive(Debug, Default, Deserialize)]
pub struct ShopQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

impl ShopQuery {
    /// Listing filter. A malformed category id is ignored rather than rejected.
    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self
                .category
                .as_deref()
                .and_then(|raw| raw.trim().parse::<CategoryId>().ok()),
            query: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryLink {
    pub name: String,
    pub url: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ProductCard {
    pub url: String,
    pub name: String,
    pub category: Option<String>,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub image_url: Option<String>,
    pub in_stock: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(shop: &Shop, product: &Product) -> Self {
        Self {
            url: format!("{}/product/{}", shop.url(), product.id),
            name: product.name.clone(),
            category: product.category_name.clone(),
            price: shop.format_price(product.price),
            compare_at_price: product.sale_reference().map(|p| shop.format_price(p)),
            image_url: product.image_url.clone(),
            in_stock: product.in_stock(),
        }
    }
}

fn category_links(shop: &Shop, categories: &[Category], filter: &ProductFilter) -> Vec<CategoryLink> {
    categories
        .iter()
        .map(|c| CategoryLink {
            name: c.name.clone(),
            url: format!("{}?category={}", shop.url(), c.id),
            active: filter.category == Some(c.id),
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopTemplate {
    pub page: PageContext,
    pub shop_url: String,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub categories: Vec<CategoryLink>,
    pub all_active: bool,
    pub query: String,
    pub products: Vec<ProductCard>,
}

/// GET /shop/{slug}
#[instrument(skip(state, nonce, query), fields(shop_id))]
pub async fn index(
    State(state): State<AppState>,
    nonce: CspNonce,
    Path(slug): Path<String>,
    Query(query): Query<ShopQuery>,
) -> Result<impl IntoResponse> {
    let shop = load_shop(&state, &slug).await?;
    tracing::Span::current().record("shop_id", tracing::field::display(shop.id));

    let filter = query.filter();
    let repo = StorefrontRepository::new(state.pool());
    let categories = repo.categories(shop.id).await?;
    let products = repo.published_products(shop.id, &filter).await?;

    Ok(ShopTemplate {
        page: PageContext::for_shop(&state, &nonce, &shop, "Shop", None),
        shop_url: shop.url(),
        description: shop.description.clone(),
        banner_url: shop.banner_url.clone(),
        categories: category_links(&shop, &categories, &filter),
        all_active: filter.category.is_none(),
        query: filter.query.clone().unwrap_or_default(),
        products: products.iter().map(|p| ProductCard::new(&shop, p)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_ignores_bad_category_and_blank_query() {
        let query = ShopQuery {
            category: Some("nope".to_string()),
            q: Some("   ".to_string()),
        };
        assert_eq!(query.filter(), ProductFilter::default());
    }

    #[test]
    fn test_filter_parses_values() {
        let id = CategoryId::generate();
        let query = ShopQuery {
            category: Some(id.to_string()),
            q: Some(" Watch ".to_string()),
        };
        let filter = query.filter();
        assert_eq!(filter.category, Some(id));
        assert_eq!(filter.query.as_deref(), Some("Watch"));
    }

    #[test]
    fn test_category_links_mark_active() {
        let shop = crate::routes::tests::shop();
        let phones = Category {
            id: CategoryId::generate(),
            name: "Phones".to_string(),
        };
        let laptops = Category {
            id: CategoryId::generate(),
            name: "Laptops".to_string(),
        };
        let filter = ProductFilter {
            category: Some(laptops.id),
            query: None,
        };

        let links = category_links(&shop, &[phones, laptops.clone()], &filter);
        assert!(!links.first().is_some_and(|l| l.active));
        assert!(links.get(1).is_some_and(|l| l.active));
        assert_eq!(
            links.get(1).map(|l| l.url.clone()),
            Some(format!("/shop/tech-store?category={}", laptops.id))
        );
    }
}
