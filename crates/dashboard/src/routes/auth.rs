//! Sign-up, login and logout.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{clear_current_merchant, set_current_merchant};
use crate::models::{CurrentMerchant, MerchantUser, session_keys};
use crate::services::{AuthService, Signup};
use crate::state::AppState;

use super::{FlashQuery, render};

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Sign-up page template.
#[derive(Template)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub email: String,
    pub shop_name: String,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    #[serde(default)]
    pub shop_name: String,
}

async fn is_logged_in(session: &Session) -> bool {
    matches!(
        session
            .get::<CurrentMerchant>(session_keys::CURRENT_MERCHANT)
            .await,
        Ok(Some(_))
    )
}

async fn start_session(session: &Session, user: &MerchantUser) -> Result<()> {
    set_current_merchant(
        session,
        &CurrentMerchant {
            id: user.id,
            email: user.email.clone(),
        },
    )
    .await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// GET /auth/login
#[instrument(skip(session, flash))]
pub async fn login_page(session: Session, Query(flash): Query<FlashQuery>) -> Response {
    if is_logged_in(&session).await {
        return Redirect::to("/dashboard").into_response();
    }

    render(&LoginTemplate {
        email: String::new(),
        error: flash.error,
        success: flash.success,
    })
}

/// POST /auth/login
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            start_session(&session, &user).await?;
            tracing::info!(merchant_id = %user.id, "Merchant logged in");
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(e) if e.is_user_facing() => {
            tracing::warn!("Failed login attempt");
            Ok(render(&LoginTemplate {
                email: form.email,
                error: Some(e.to_string()),
                success: None,
            }))
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// GET /auth/signup
#[instrument(skip(session))]
pub async fn signup_page(session: Session) -> Response {
    if is_logged_in(&session).await {
        return Redirect::to("/dashboard").into_response();
    }

    render(&SignupTemplate {
        email: String::new(),
        shop_name: String::new(),
        error: None,
    })
}

/// POST /auth/signup
#[instrument(skip(state, session, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let result = AuthService::new(state.pool())
        .register(Signup {
            email: &form.email,
            password: &form.password,
            password_confirm: &form.password_confirm,
            shop_name: &form.shop_name,
        })
        .await;

    match result {
        Ok((user, shop)) => {
            start_session(&session, &user).await?;
            tracing::info!(merchant_id = %user.id, shop_id = %shop.id, slug = %shop.slug, "Merchant signed up");
            Ok(super::redirect_success(
                "/dashboard",
                &format!("Welcome to Converty! Your shop {} is ready.", shop.name),
            ))
        }
        Err(e) if e.is_user_facing() => Ok(render(&SignupTemplate {
            email: form.email,
            shop_name: form.shop_name,
            error: Some(e.to_string()),
        })),
        Err(e) => Err(AppError::from(e)),
    }
}

/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_merchant(&session).await {
        tracing::warn!(error = %e, "Failed to clear session on logout");
    }
    clear_sentry_user();

    super::redirect_success(LOGIN_PATH, "You have been signed out")
}
