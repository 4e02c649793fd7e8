//! Category route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use converty_core::CategoryId;

use crate::db::{CategoryRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::ShopSession;
use crate::models::{Category, CategoryForm};
use crate::state::AppState;

use super::{FlashQuery, ShellView, redirect_error, redirect_success, render};

const CATEGORIES_PATH: &str = "/dashboard/categories";

#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub display_order: i32,
}

impl From<&Category> for CategoryView {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            description: c.description.clone().unwrap_or_default(),
            display_order: c.display_order,
        }
    }
}

#[derive(Template)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub categories: Vec<CategoryView>,
}

#[derive(Template)]
#[template(path = "categories/edit.html")]
pub struct CategoryEditTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub category: CategoryView,
}

/// GET /dashboard/categories
#[instrument(skip_all)]
pub async fn index(
    session: ShopSession,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let categories = CategoryRepository::new(state.pool())
        .list(session.shop.id)
        .await?;

    Ok(render(&CategoriesIndexTemplate {
        shell: ShellView::new(&state, &session, CATEGORIES_PATH),
        flash,
        categories: categories.iter().map(CategoryView::from).collect(),
    }))
}

/// POST /dashboard/categories
///
/// Quick add; a blank name is ignored.
#[instrument(skip_all)]
pub async fn create(
    session: ShopSession,
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    if form.name.trim().is_empty() {
        return Ok(Redirect::to(CATEGORIES_PATH).into_response());
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return Ok(redirect_error(CATEGORIES_PATH, &e.0)),
    };

    match CategoryRepository::new(state.pool())
        .create(session.shop.id, &input)
        .await
    {
        Ok(category) => {
            tracing::info!(category_id = %category.id, "Category created");
            Ok(redirect_success(
                CATEGORIES_PATH,
                &format!("Category \"{}\" added", category.name),
            ))
        }
        Err(RepositoryError::Conflict(message)) => Ok(redirect_error(CATEGORIES_PATH, &message)),
        Err(e) => Err(e.into()),
    }
}

/// GET /dashboard/categories/{id}
#[instrument(skip(session, state, flash))]
pub async fn edit(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let category = CategoryRepository::new(state.pool())
        .get(session.shop.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("category".to_string()))?;

    Ok(render(&CategoryEditTemplate {
        shell: ShellView::new(&state, &session, CATEGORIES_PATH),
        flash,
        category: CategoryView::from(&category),
    }))
}

/// POST /dashboard/categories/{id}
#[instrument(skip(session, state, form))]
pub async fn update(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let edit_path = format!("{CATEGORIES_PATH}/{id}");
    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return Ok(redirect_error(&edit_path, &e.0)),
    };

    match CategoryRepository::new(state.pool())
        .update(session.shop.id, id, &input)
        .await
    {
        Ok(_) => Ok(redirect_success(CATEGORIES_PATH, "Category updated")),
        Err(RepositoryError::NotFound) => Ok(redirect_error(CATEGORIES_PATH, "Category not found")),
        Err(RepositoryError::Conflict(message)) => Ok(redirect_error(&edit_path, &message)),
        Err(e) => Err(e.into()),
    }
}

/// POST /dashboard/categories/{id}/delete
#[instrument(skip(session, state))]
pub async fn delete(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    match CategoryRepository::new(state.pool())
        .delete(session.shop.id, id)
        .await
    {
        Ok(()) => {
            tracing::info!(category_id = %id, "Category deleted");
            Ok(redirect_success(CATEGORIES_PATH, "Category deleted"))
        }
        Err(RepositoryError::NotFound) => Ok(redirect_error(CATEGORIES_PATH, "Category not found")),
        Err(e) => Err(e.into()),
    }
}
