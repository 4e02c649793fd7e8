//! Merchant account commands.

use converty_core::{Email, Slug};
use converty_dashboard::db::{NewMerchant, UserRepository};
use converty_dashboard::models::{MerchantUser, Shop};
use converty_dashboard::services::AuthService;
use converty_dashboard::services::auth::{hash_password, validate_password};
use sqlx::PgPool;

use super::{CommandError, connect};

/// Resolve the shop slug: an explicit one must be valid, otherwise derive it.
fn shop_slug(shop_name: &str, slug: Option<&str>) -> Result<Slug, CommandError> {
    match slug {
        Some(raw) => Slug::parse(raw).map_err(|e| CommandError::Invalid(format!("--slug: {e}"))),
        None => Slug::from_name(shop_name).ok_or_else(|| {
            CommandError::Invalid("Shop name needs letters or digits; pass --slug".to_string())
        }),
    }
}

/// Create a confirmed merchant with their shop and free subscription.
///
/// Shared with `seed`, which passes its own pool.
pub(crate) async fn create_with_pool(
    pool: &PgPool,
    email: &str,
    password: &str,
    shop_name: &str,
    slug: Option<&str>,
) -> Result<(MerchantUser, Shop), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let shop_name = shop_name.trim();
    if shop_name.is_empty() {
        return Err(CommandError::Invalid("Shop name is required".to_string()));
    }
    let slug = shop_slug(shop_name, slug)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let created = UserRepository::new(pool)
        .create_with_shop(NewMerchant {
            email: &email,
            password_hash: &password_hash,
            shop_name,
            shop_slug: &slug,
            email_confirmed: true,
        })
        .await?;

    Ok(created)
}

/// Create a merchant from the command line.
pub async fn create(
    email: &str,
    password: &str,
    shop_name: &str,
    slug: Option<&str>,
) -> Result<(), CommandError> {
    let pool = connect().await?;
    let (user, shop) = create_with_pool(&pool, email, password, shop_name, slug).await?;

    tracing::info!("Merchant created successfully!");
    tracing::info!("  ID: {}", user.id);
    tracing::info!("  Email: {}", user.email);
    tracing::info!("  Shop: {} (/shop/{})", shop.name, shop.slug);
    Ok(())
}

/// Replace the password of an existing merchant.
pub async fn set_password(email: &str, password: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::Invalid(format!("No merchant with email {email}")))?;

    AuthService::new(&pool).set_password(user.id, password).await?;

    tracing::info!("Password updated for {}", user.email);
    Ok(())
}
