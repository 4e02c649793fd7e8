//! Demo data for local development.
//!
//! Creates two merchants, each with a shop, categories, products and one
//! order. Merchants that already exist are left untouched, so the command
//! can be re-run safely.

use rust_decimal::Decimal;
use sqlx::PgPool;

use converty_core::{CategoryId, CurrencyCode, Email, OrderStatus, ProductStatus, ShopId};
use converty_dashboard::db::{CategoryRepository, OrderRepository, ProductRepository, ShopRepository, UserRepository};
use converty_dashboard::models::{CategoryInput, NewOrder, NewOrderLine, ProductInput, Shop, ShopSettingsInput};

use super::merchant::create_with_pool;
use super::{CommandError, connect};

/// Password shared by the demo merchants.
pub const DEMO_PASSWORD: &str = "TestPassword123!";

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    /// Price in cents.
    price: i64,
    compare_at: Option<i64>,
    sku: &'static str,
    quantity: i32,
    /// Index into the merchant's categories.
    category: usize,
    published: bool,
}

struct DemoOrder {
    customer_name: &'static str,
    customer_email: &'static str,
    customer_phone: &'static str,
    customer_city: &'static str,
    customer_address: &'static str,
    status: OrderStatus,
    /// (product index, quantity)
    lines: &'static [(usize, i32)],
}

struct DemoMerchant {
    email: &'static str,
    shop_name: &'static str,
    slug: &'static str,
    categories: &'static [(&'static str, &'static str)],
    products: &'static [DemoProduct],
    order: DemoOrder,
}

const DEMO_MERCHANTS: [DemoMerchant; 2] = [
    DemoMerchant {
        email: "merchant1@test.com",
        shop_name: "Tech Store",
        slug: "tech-store",
        categories: &[
            ("Electronics", "Headphones, watches and gadgets"),
            ("Accessories", "Cables, stands and everything in between"),
        ],
        products: &[
            DemoProduct {
                name: "Wireless Headphones",
                description: "Over-ear Bluetooth headphones with active noise cancelling and 30-hour battery life.",
                price: 7999,
                compare_at: Some(9999),
                sku: "TECH-001",
                quantity: 50,
                category: 0,
                published: true,
            },
            DemoProduct {
                name: "Smart Watch",
                description: "Fitness tracking, heart-rate monitor and notifications on your wrist.",
                price: 19999,
                compare_at: None,
                sku: "TECH-002",
                quantity: 25,
                category: 0,
                published: true,
            },
            DemoProduct {
                name: "USB-C Charging Cable",
                description: "Braided 2 m USB-C cable, 100 W fast charging.",
                price: 1299,
                compare_at: None,
                sku: "TECH-003",
                quantity: 200,
                category: 1,
                published: true,
            },
            DemoProduct {
                name: "Aluminium Laptop Stand",
                description: "Adjustable stand for laptops up to 17 inches.",
                price: 3999,
                compare_at: Some(4999),
                sku: "TECH-004",
                quantity: 0,
                category: 1,
                published: true,
            },
            DemoProduct {
                name: "Mechanical Keyboard",
                description: "Hot-swappable switches. Coming soon.",
                price: 12900,
                compare_at: None,
                sku: "TECH-005",
                quantity: 10,
                category: 0,
                published: false,
            },
        ],
        order: DemoOrder {
            customer_name: "John Doe",
            customer_email: "john.doe@example.com",
            customer_phone: "+1 555 0100",
            customer_city: "New York",
            customer_address: "123 Main Street, Apt 4B",
            status: OrderStatus::Pending,
            lines: &[(0, 1), (2, 2)],
        },
    },
    DemoMerchant {
        email: "merchant2@test.com",
        shop_name: "Fashion Hub",
        slug: "fashion-hub",
        categories: &[
            ("Clothing", "Everyday essentials"),
            ("Shoes", "Sneakers and boots"),
        ],
        products: &[
            DemoProduct {
                name: "Classic Cotton T-Shirt",
                description: "Soft organic cotton tee in a relaxed fit.",
                price: 2499,
                compare_at: Some(2999),
                sku: "FH-001",
                quantity: 120,
                category: 0,
                published: true,
            },
            DemoProduct {
                name: "Denim Jacket",
                description: "Timeless stonewashed denim jacket.",
                price: 8999,
                compare_at: None,
                sku: "FH-002",
                quantity: 30,
                category: 0,
                published: true,
            },
            DemoProduct {
                name: "Summer Dress",
                description: "Lightweight linen dress for warm days.",
                price: 5999,
                compare_at: Some(7499),
                sku: "FH-003",
                quantity: 40,
                category: 0,
                published: true,
            },
            DemoProduct {
                name: "Running Sneakers",
                description: "Breathable mesh sneakers with cushioned soles.",
                price: 11999,
                compare_at: None,
                sku: "FH-004",
                quantity: 15,
                category: 1,
                published: true,
            },
        ],
        order: DemoOrder {
            customer_name: "Jane Smith",
            customer_email: "jane.smith@example.com",
            customer_phone: "+1 555 0199",
            customer_city: "Chicago",
            customer_address: "42 Lake Shore Drive",
            status: OrderStatus::Completed,
            lines: &[(1, 1)],
        },
    },
];

/// Counts reported at the end of a seed run.
#[derive(Debug, Default, PartialEq, Eq)]
struct SeedSummary {
    merchants_created: usize,
    merchants_skipped: usize,
    categories: usize,
    products: usize,
    orders: usize,
}

/// Seed all demo merchants.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut summary = SeedSummary::default();

    for demo in &DEMO_MERCHANTS {
        let email = Email::parse(demo.email).map_err(|e| CommandError::Invalid(e.to_string()))?;
        if UserRepository::new(&pool).get_by_email(&email).await?.is_some() {
            tracing::info!(email = demo.email, "Merchant already exists, skipping");
            summary.merchants_skipped += 1;
            continue;
        }

        let (_, shop) =
            create_with_pool(&pool, demo.email, DEMO_PASSWORD, demo.shop_name, Some(demo.slug)).await?;
        summary.merchants_created += 1;

        seed_shop(&pool, &shop, demo, &mut summary).await?;
        tracing::info!(shop = %shop.slug, "Seeded shop");
    }

    tracing::info!("Seeding complete!");
    tracing::info!("  Merchants created: {}", summary.merchants_created);
    tracing::info!("  Merchants skipped (already exist): {}", summary.merchants_skipped);
    tracing::info!("  Categories: {}", summary.categories);
    tracing::info!("  Products: {}", summary.products);
    tracing::info!("  Orders: {}", summary.orders);
    tracing::info!("");
    tracing::info!("Test credentials (password: {DEMO_PASSWORD}):");
    for demo in &DEMO_MERCHANTS {
        tracing::info!("  {} - {} - /shop/{}", demo.email, demo.shop_name, demo.slug);
    }

    Ok(())
}

async fn seed_shop(
    pool: &PgPool,
    shop: &Shop,
    demo: &DemoMerchant,
    summary: &mut SeedSummary,
) -> Result<(), CommandError> {
    ShopRepository::new(pool)
        .update_settings(shop.id, &demo_settings(shop))
        .await?;

    let categories = CategoryRepository::new(pool);
    let mut category_ids: Vec<CategoryId> = Vec::with_capacity(demo.categories.len());
    for (name, description) in demo.categories {
        let category = categories
            .create(
                shop.id,
                &CategoryInput {
                    name: (*name).to_string(),
                    description: Some((*description).to_string()),
                    display_order: None,
                },
            )
            .await?;
        category_ids.push(category.id);
        summary.categories += 1;
    }

    let products = ProductRepository::new(pool);
    let mut product_ids = Vec::with_capacity(demo.products.len());
    for product in demo.products {
        let id = products
            .create(shop.id, &product_input(product, &category_ids))
            .await?;
        product_ids.push(id);
        summary.products += 1;
    }

    seed_order(pool, shop.id, &demo.order, &product_ids).await?;
    summary.orders += 1;

    Ok(())
}

fn demo_settings(shop: &Shop) -> ShopSettingsInput {
    ShopSettingsInput {
        name: shop.name.clone(),
        slug: shop.slug.clone(),
        description: Some(format!("{} - Test Shop", shop.name)),
        contact_email: None,
        contact_phone: None,
        address: None,
        store_currency: CurrencyCode::USD,
        tax_rate: Decimal::from(10),
    }
}

fn product_input(product: &DemoProduct, category_ids: &[CategoryId]) -> ProductInput {
    ProductInput {
        name: product.name.to_string(),
        description: product.description.to_string(),
        price: Decimal::new(product.price, 2),
        compare_at_price: product.compare_at.map(|cents| Decimal::new(cents, 2)),
        sku: Some(product.sku.to_string()),
        quantity: product.quantity,
        category_id: category_ids.get(product.category).copied(),
        status: if product.published {
            ProductStatus::Published
        } else {
            ProductStatus::Draft
        },
    }
}

async fn seed_order(
    pool: &PgPool,
    shop_id: ShopId,
    order: &DemoOrder,
    product_ids: &[converty_core::ProductId],
) -> Result<(), CommandError> {
    let lines = order
        .lines
        .iter()
        .filter_map(|(index, quantity)| {
            product_ids.get(*index).map(|product_id| NewOrderLine {
                product_id: *product_id,
                quantity: *quantity,
            })
        })
        .collect();

    let order_id = OrderRepository::new(pool)
        .create_manual(
            shop_id,
            &NewOrder {
                customer_name: order.customer_name.to_string(),
                customer_email: Email::parse(order.customer_email).ok(),
                customer_phone: Some(order.customer_phone.to_string()),
                customer_city: Some(order.customer_city.to_string()),
                customer_address: Some(order.customer_address.to_string()),
                customer_notes: None,
                status: order.status,
                lines,
            },
        )
        .await?;

    tracing::debug!(%order_id, "Seeded order");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_data_is_consistent() {
        for demo in &DEMO_MERCHANTS {
            assert!(Email::parse(demo.email).is_ok(), "{}", demo.email);
            assert!(converty_core::Slug::parse(demo.slug).is_ok(), "{}", demo.slug);
            for product in demo.products {
                assert!(product.category < demo.categories.len(), "{}", product.name);
            }
            for (index, quantity) in demo.order.lines {
                let product = &demo.products[*index];
                assert!(product.published, "{}", product.name);
                assert!(*quantity <= product.quantity, "{}", product.name);
            }
        }
    }

    #[test]
    fn test_product_input_maps_category_and_status() {
        let categories = [CategoryId::generate(), CategoryId::generate()];
        let draft = &DEMO_MERCHANTS[0].products[4];
        let input = product_input(draft, &categories);
        assert_eq!(input.status, ProductStatus::Draft);
        assert_eq!(input.category_id, categories.first().copied());
        assert_eq!(input.price, Decimal::new(12900, 2));
    }
}
