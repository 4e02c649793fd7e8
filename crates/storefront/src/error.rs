//! Storefront error type.
//!
//! Handlers return [`Result`]. Database failures are reported to Sentry and
//! shown to the buyer as a bare 500; anything the buyer can reach by typing a
//! URL (unknown shop, draft product, malformed id) renders the 404 page.
//! Checkout validation never reaches this type: it re-renders the form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::filters;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Unknown shop, unpublished product or malformed path segment.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("row".to_string()),
            other => Self::Database(other),
        }
    }
}

/// Buyer-facing 404 page. Standalone so it renders without a shop.
#[derive(Template, WebTemplate)]
#[template(path = "error/not_found.html")]
pub struct NotFoundTemplate;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(what) => {
                tracing::debug!(%what, "Not found");
                (StatusCode::NOT_FOUND, NotFoundTemplate).into_response()
            }
            Self::Database(ref e) => {
                let event_id = sentry::capture_error(e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Storefront request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Record a buyer action as a Sentry breadcrumb.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    breadcrumb.data.extend(data.iter().map(|(key, value)| {
        ((*key).to_string(), serde_json::Value::String((*value).to_string()))
    }));
    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_missing_rows_are_not_found() {
        assert_eq!(
            status(AppError::from(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::NotFound("shop nope".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_database_errors_are_opaque() {
        let response = AppError::from(RepositoryError::DataCorruption("bad enum".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_renders_page() {
        let html = NotFoundTemplate.render().unwrap_or_default();
        assert!(html.contains("Page not found"));
    }
}
