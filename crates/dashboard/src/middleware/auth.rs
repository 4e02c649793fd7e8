//! Authentication extractors for dashboard routes.
//!
//! [`RequireMerchant`] only checks the session. [`ShopSession`] additionally
//! loads the merchant's shop, which scopes every tenant query that follows.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::ShopRepository;
use crate::models::{CurrentMerchant, Shop, session_keys};
use crate::state::AppState;

/// Login page unauthenticated requests are sent to.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a logged-in merchant.
pub struct RequireMerchant(pub CurrentMerchant);

/// The logged-in merchant together with their shop.
pub struct ShopSession {
    pub merchant: CurrentMerchant,
    pub shop: Shop,
}

/// Rejection when the request has no usable merchant session.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The merchant has no shop.
    NoShop,
    /// The session or shop could not be loaded.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::NoShop => Redirect::to(&format!(
                "{LOGIN_PATH}?error={}",
                urlencoding::encode("No shop found for this account")
            ))
            .into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

fn missing_session(parts: &Parts) -> AuthRejection {
    if parts.uri.path().starts_with("/api/") {
        AuthRejection::Unauthorized
    } else {
        AuthRejection::RedirectToLogin
    }
}

async fn current_merchant(parts: &Parts) -> Result<CurrentMerchant, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    session
        .get::<CurrentMerchant>(session_keys::CURRENT_MERCHANT)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| missing_session(parts))
}

impl<S> FromRequestParts<S> for RequireMerchant
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_merchant(parts).await.map(Self)
    }
}

impl FromRequestParts<AppState> for ShopSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let merchant = current_merchant(parts).await?;

        let shop = ShopRepository::new(state.pool())
            .get_by_owner(merchant.id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, merchant_id = %merchant.id, "Failed to load shop");
                AuthRejection::Internal
            })?
            .ok_or(AuthRejection::NoShop)?;

        tracing::Span::current().record("shop_id", tracing::field::display(shop.id));

        Ok(Self { merchant, shop })
    }
}

/// Store the logged-in merchant in the session.
///
/// The session ID is cycled first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_merchant(
    session: &Session,
    merchant: &CurrentMerchant,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_MERCHANT, merchant)
        .await
}

/// Clear the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_merchant(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
