//! Shop settings and integrations.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::Response,
};
use tracing::instrument;

use converty_core::CurrencyCode;

use crate::db::{RepositoryError, ShopRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::ShopSession;
use crate::models::{IntegrationsForm, SettingsForm, Shop};
use crate::state::AppState;

use super::products::SelectOption;
use super::{FlashQuery, ShellView, redirect_error, redirect_success, render};

const SETTINGS_PATH: &str = "/dashboard/settings";

#[derive(Template)]
#[template(path = "settings/index.html")]
pub struct SettingsTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub name: String,
    pub slug: String,
    pub storefront_prefix: String,
    pub description: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub currencies: Vec<SelectOption>,
    pub tax_rate: String,
    pub facebook_pixel_id: String,
    pub pixel_active: bool,
}

fn currency_options(selected: CurrencyCode) -> Vec<SelectOption> {
    CurrencyCode::ALL
        .iter()
        .map(|c| SelectOption {
            value: c.code().to_string(),
            label: format!("{} ({})", c.name(), c.code()),
            selected: *c == selected,
        })
        .collect()
}

fn settings_template(state: &AppState, session: &ShopSession, flash: FlashQuery) -> SettingsTemplate {
    let shop: &Shop = &session.shop;
    let pixel = shop.facebook_pixel_id.clone().unwrap_or_default();
    SettingsTemplate {
        shell: ShellView::new(state, session, SETTINGS_PATH),
        flash,
        name: shop.name.clone(),
        slug: shop.slug.to_string(),
        storefront_prefix: format!("{}/shop/", state.config().storefront_url),
        description: shop.description.clone().unwrap_or_default(),
        contact_email: shop.contact_email.clone().unwrap_or_default(),
        contact_phone: shop.contact_phone.clone().unwrap_or_default(),
        address: shop.address.clone().unwrap_or_default(),
        currencies: currency_options(shop.store_currency),
        tax_rate: shop.tax_rate.normalize().to_string(),
        pixel_active: !pixel.is_empty(),
        facebook_pixel_id: pixel,
    }
}

/// GET /dashboard/settings
#[instrument(skip_all)]
pub async fn show(
    session: ShopSession,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    render(&settings_template(&state, &session, flash))
}

/// POST /dashboard/settings
#[instrument(skip_all)]
pub async fn update(
    session: ShopSession,
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return Ok(redirect_error(SETTINGS_PATH, &e.0)),
    };

    match ShopRepository::new(state.pool())
        .update_settings(session.shop.id, &input)
        .await
    {
        Ok(shop) => {
            tracing::info!(slug = %shop.slug, "Shop settings updated");
            Ok(redirect_success(SETTINGS_PATH, "Settings saved"))
        }
        Err(RepositoryError::Conflict(message)) => Ok(redirect_error(SETTINGS_PATH, &message)),
        Err(e) => Err(e.into()),
    }
}

/// POST /dashboard/settings/integrations
#[instrument(skip_all)]
pub async fn update_integrations(
    session: ShopSession,
    State(state): State<AppState>,
    Form(form): Form<IntegrationsForm>,
) -> Result<Response> {
    let pixel_id = match form.validate() {
        Ok(pixel_id) => pixel_id,
        Err(e) => return Ok(redirect_error(SETTINGS_PATH, &e.0)),
    };

    ShopRepository::new(state.pool())
        .update_integrations(session.shop.id, pixel_id.as_ref())
        .await?;

    let message = if pixel_id.is_some() {
        tracing::info!("Facebook Pixel enabled");
        "Facebook Pixel saved"
    } else {
        tracing::info!("Facebook Pixel removed");
        "Facebook Pixel removed"
    };
    Ok(redirect_success(SETTINGS_PATH, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_options_select_shop_currency() {
        let options = currency_options(CurrencyCode::EUR);
        assert_eq!(options.len(), CurrencyCode::ALL.len());
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert!(selected.iter().all(|o| o.value == "EUR"));
    }
}
