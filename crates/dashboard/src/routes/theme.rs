//! Theme editor: colours, font, logo and banner.

use askama::Template;
use axum::{
    extract::{Multipart, Query, State},
    response::Response,
};
use tracing::instrument;

use converty_core::{FontFamily, ShopId};

use crate::db::ShopRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::ShopSession;
use crate::models::ThemeForm;
use crate::services::media::theme_asset_key;
use crate::services::{ImageUpload, MediaStore};
use crate::state::AppState;

use super::products::SelectOption;
use super::{FlashQuery, ShellView, redirect_error, redirect_success, render};

const THEME_PATH: &str = "/dashboard/theme";

#[derive(Template)]
#[template(path = "theme/index.html")]
pub struct ThemeTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub fonts: Vec<SelectOption>,
    pub logo_url: String,
    pub banner_url: String,
}

/// Multipart theme submission.
#[derive(Debug, Default)]
struct ThemeSubmission {
    form: ThemeForm,
    logo: Option<ImageUpload>,
    banner: Option<ImageUpload>,
    skipped: Vec<String>,
}

impl ThemeSubmission {
    async fn read(mut multipart: Multipart, max_bytes: usize) -> Result<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "logo" | "banner" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
                        continue;
                    }
                    match ImageUpload::validate(
                        file_name.as_deref(),
                        content_type.as_deref(),
                        bytes.to_vec(),
                        max_bytes,
                    ) {
                        Ok(upload) if name == "logo" => submission.logo = Some(upload),
                        Ok(upload) => submission.banner = Some(upload),
                        Err(e) => {
                            tracing::warn!(error = %e, field = %name, "Skipping rejected theme image");
                            submission.skipped.push(e.to_string());
                        }
                    }
                }
                "primary_color" => submission.form.primary_color = field.text().await?,
                "secondary_color" => submission.form.secondary_color = field.text().await?,
                "accent_color" => submission.form.accent_color = field.text().await?,
                "font_family" => submission.form.font_family = field.text().await?,
                "remove_logo" => submission.form.remove_logo = true,
                "remove_banner" => submission.form.remove_banner = true,
                _ => {}
            }
        }

        Ok(submission)
    }
}

/// Media key behind a public URL produced by this dashboard, if any.
fn key_for_url<'a>(media_base_url: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(media_base_url)?
        .strip_prefix('/')
        .filter(|key| !key.is_empty())
}

/// Store a theme asset and return its public URL.
async fn store_asset(
    state: &AppState,
    shop_id: ShopId,
    kind: &str,
    upload: &ImageUpload,
) -> Result<String> {
    let key = theme_asset_key(shop_id, kind, &upload.extension());
    state.media().put(&key, &upload.bytes).await?;
    Ok(state.media().public_url(&key))
}

/// Remove a replaced asset; failures are only logged.
async fn discard_asset(state: &AppState, old_url: Option<&str>) {
    let Some(key) = old_url.and_then(|url| key_for_url(&state.config().media.base_url, url)) else {
        return;
    };
    if let Err(e) = state.media().delete(key).await {
        tracing::warn!(error = %e, key = %key, "Failed to delete replaced theme asset");
    }
}

/// New value for a logo/banner column: `None` keeps the current image.
fn asset_change(uploaded: Option<&str>, remove: bool) -> Option<Option<&str>> {
    match (uploaded, remove) {
        (Some(url), _) => Some(Some(url)),
        (None, true) => Some(None),
        (None, false) => None,
    }
}

/// GET /dashboard/theme
#[instrument(skip_all)]
pub async fn show(
    session: ShopSession,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let shop = &session.shop;
    render(&ThemeTemplate {
        shell: ShellView::new(&state, &session, THEME_PATH),
        flash,
        primary_color: shop.primary_color.to_string(),
        secondary_color: shop.secondary_color.to_string(),
        accent_color: shop.accent_color.to_string(),
        fonts: FontFamily::ALL
            .iter()
            .map(|f| SelectOption {
                value: f.as_str().to_string(),
                label: f.label().to_string(),
                selected: *f == shop.font_family,
            })
            .collect(),
        logo_url: shop.logo_url.clone().unwrap_or_default(),
        banner_url: shop.banner_url.clone().unwrap_or_default(),
    })
}

/// POST /dashboard/theme
#[instrument(skip_all)]
pub async fn update(
    session: ShopSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let shop = &session.shop;
    let submission = ThemeSubmission::read(multipart, state.config().media.max_upload_bytes).await?;

    let theme = match submission.form.validate() {
        Ok(theme) => theme,
        Err(e) => return Ok(redirect_error(THEME_PATH, &e.0)),
    };

    let logo_url = match &submission.logo {
        Some(upload) => Some(store_asset(&state, shop.id, "logo", upload).await?),
        None => None,
    };
    let banner_url = match &submission.banner {
        Some(upload) => Some(store_asset(&state, shop.id, "banner", upload).await?),
        None => None,
    };

    let logo_change = asset_change(logo_url.as_deref(), submission.form.remove_logo);
    let banner_change = asset_change(banner_url.as_deref(), submission.form.remove_banner);

    ShopRepository::new(state.pool())
        .update_theme(shop.id, &theme, logo_change, banner_change)
        .await?;

    if logo_change.is_some() {
        discard_asset(&state, shop.logo_url.as_deref()).await;
    }
    if banner_change.is_some() {
        discard_asset(&state, shop.banner_url.as_deref()).await;
    }
    tracing::info!(font = %theme.font_family, "Theme updated");

    if submission.skipped.is_empty() {
        Ok(redirect_success(THEME_PATH, "Theme saved"))
    } else {
        Ok(redirect_error(
            THEME_PATH,
            &format!("Theme saved, but {}", submission.skipped.join("; ")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_for_url() {
        assert_eq!(
            key_for_url("/media", "/media/shop/theme/logo-1.png"),
            Some("shop/theme/logo-1.png")
        );
        assert_eq!(key_for_url("/media", "https://cdn.example.com/logo.png"), None);
        assert_eq!(key_for_url("/media", "/media/"), None);
        assert_eq!(key_for_url("/media", "/mediafoo/x.png"), None);
    }

    #[test]
    fn test_asset_change() {
        assert_eq!(asset_change(Some("/media/a.png"), false), Some(Some("/media/a.png")));
        assert_eq!(asset_change(Some("/media/a.png"), true), Some(Some("/media/a.png")));
        assert_eq!(asset_change(None, true), Some(None));
        assert_eq!(asset_change(None, false), None);
    }
}
