//! Product catalog route handlers.
//!
//! Create and edit are multipart forms: text fields plus any number of
//! `images` file parts. Rejected files are skipped with a warning and the
//! rest of the submission proceeds.

use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::Response,
};
use tracing::instrument;

use converty_core::{
    ProductId, ProductImageId, ProductStatus, ShopId, SubscriptionPlan,
};

use crate::db::{BillingRepository, CategoryRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::ShopSession;
use crate::models::{Category, Product, ProductForm, ProductImage, ProductInput, Shop};
use crate::services::media::{product_image_key, product_prefix};
use crate::services::{ImageUpload, MediaStore};
use crate::state::AppState;

use super::{
    FlashQuery, MAX_IMAGES_PER_UPLOAD, ShellView, redirect_error, redirect_success, render,
};

const PRODUCTS_PATH: &str = "/dashboard/products";
const NEW_PRODUCT_PATH: &str = "/dashboard/products/new";

/// Product row for the catalog table.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub compare_at_price: String,
    pub quantity: i32,
    pub in_stock: bool,
    pub is_draft: bool,
    pub status_label: &'static str,
    pub image_url: String,
    pub view_url: String,
}

impl ProductRowView {
    fn new(product: &Product, shop: &Shop, shop_url: &str) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product
                .category_name
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_string()),
            price: shop.format_price(product.price),
            compare_at_price: product
                .compare_at_price
                .map(|p| shop.format_price(p))
                .unwrap_or_default(),
            quantity: product.quantity,
            in_stock: product.in_stock(),
            is_draft: product.status == ProductStatus::Draft,
            status_label: product.status.label(),
            image_url: product.image_url.clone().unwrap_or_default(),
            view_url: format!("{shop_url}/product/{}", product.id),
        }
    }
}

/// `<option>` of a select.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Gallery image on the edit page.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub id: String,
    pub url: String,
    pub is_main: bool,
}

/// Values shown in the product form.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub name: String,
    pub description: String,
    pub price: String,
    pub compare_at_price: String,
    pub sku: String,
    pub quantity: String,
    pub categories: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
}

impl ProductFormView {
    fn from_form(form: &ProductForm, categories: &[Category]) -> Self {
        Self {
            name: form.name.clone(),
            description: form.description.clone(),
            price: form.price.clone(),
            compare_at_price: form.compare_at_price.clone(),
            sku: form.sku.clone(),
            quantity: form.quantity.clone(),
            categories: category_options(categories, form.category_id.trim()),
            statuses: status_options(form.status.trim()),
        }
    }

    fn from_product(product: &Product, categories: &[Category]) -> Self {
        let category_id = product
            .category_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            compare_at_price: product
                .compare_at_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            sku: product.sku.clone().unwrap_or_default(),
            quantity: product.quantity.to_string(),
            categories: category_options(categories, &category_id),
            statuses: status_options(product.status.as_str()),
        }
    }
}

fn category_options(categories: &[Category], selected: &str) -> Vec<SelectOption> {
    categories
        .iter()
        .map(|c| {
            let value = c.id.to_string();
            SelectOption {
                selected: value == selected,
                value,
                label: c.name.clone(),
            }
        })
        .collect()
}

fn status_options(selected: &str) -> Vec<SelectOption> {
    let selected = if selected.is_empty() {
        ProductStatus::default().as_str()
    } else {
        selected
    };
    ProductStatus::ALL
        .iter()
        .map(|s| SelectOption {
            value: s.as_str().to_string(),
            label: s.label().to_string(),
            selected: s.as_str() == selected,
        })
        .collect()
}

#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub products: Vec<ProductRowView>,
    pub plan_name: &'static str,
    pub limit_note: String,
}

#[derive(Template)]
#[template(path = "products/new.html")]
pub struct ProductNewTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub form: ProductFormView,
    pub max_images: usize,
}

#[derive(Template)]
#[template(path = "products/edit.html")]
pub struct ProductEditTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub id: String,
    pub view_url: String,
    pub form: ProductFormView,
    pub images: Vec<ImageView>,
    pub max_images: usize,
}

/// Parsed multipart product submission.
#[derive(Debug, Default)]
struct ProductSubmission {
    form: ProductForm,
    uploads: Vec<ImageUpload>,
    skipped: usize,
}

impl ProductSubmission {
    /// Read text fields and `images` parts. Invalid files are skipped.
    async fn read(mut multipart: Multipart, max_bytes: usize) -> Result<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name != "images" {
                let value = field.text().await?;
                submission.form.set_field(&name, value);
                continue;
            }

            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;

            // Browsers send one empty part when no file was chosen.
            if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
                continue;
            }
            if submission.uploads.len() >= MAX_IMAGES_PER_UPLOAD {
                tracing::warn!(file = ?file_name, "Skipping image over the per-upload limit");
                submission.skipped += 1;
                continue;
            }

            match ImageUpload::validate(
                file_name.as_deref(),
                content_type.as_deref(),
                bytes.to_vec(),
                max_bytes,
            ) {
                Ok(upload) => submission.uploads.push(upload),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping rejected image");
                    submission.skipped += 1;
                }
            }
        }

        Ok(submission)
    }
}

/// Upload files and attach them to the product, in order.
///
/// Returns how many files could not be stored.
async fn store_images(
    state: &AppState,
    shop_id: ShopId,
    product_id: ProductId,
    uploads: &[ImageUpload],
) -> Result<usize> {
    if uploads.is_empty() {
        return Ok(0);
    }

    let media = state.media();
    let mut stored = Vec::with_capacity(uploads.len());
    let mut failed = 0;
    for upload in uploads {
        let key = product_image_key(shop_id, product_id, &upload.extension());
        match media.put(&key, &upload.bytes).await {
            Ok(()) => stored.push((media.public_url(&key), key)),
            Err(e) => {
                tracing::warn!(error = %e, file = %upload.file_name, "Failed to store image");
                failed += 1;
            }
        }
    }

    if stored.is_empty() {
        return Ok(failed);
    }

    if let Err(e) = ProductRepository::new(state.pool())
        .attach_images(shop_id, product_id, &stored)
        .await
    {
        for (_, key) in &stored {
            if let Err(e) = media.delete(key).await {
                tracing::warn!(error = %e, key = %key, "Failed to clean up image");
            }
        }
        return Err(e.into());
    }

    Ok(failed)
}

/// Validate the text fields and check the category belongs to the shop.
async fn validate_submission(
    state: &AppState,
    shop_id: ShopId,
    form: &ProductForm,
) -> Result<std::result::Result<ProductInput, String>> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return Ok(Err(e.0)),
    };

    if let Some(category_id) = input.category_id
        && CategoryRepository::new(state.pool())
            .get(shop_id, category_id)
            .await?
            .is_none()
    {
        return Ok(Err("Unknown category".to_string()));
    }

    Ok(Ok(input))
}

async fn current_plan(state: &AppState, shop_id: ShopId) -> Result<SubscriptionPlan> {
    Ok(BillingRepository::new(state.pool())
        .subscription(shop_id)
        .await?
        .map_or(SubscriptionPlan::Free, |s| s.plan))
}

fn limit_message(plan: SubscriptionPlan) -> String {
    plan.product_limit().map_or_else(
        || format!("The {} plan has no product limit.", plan.name()),
        |limit| {
            format!(
                "The {} plan allows up to {limit} products. Upgrade to add more.",
                plan.name()
            )
        },
    )
}

fn saved_message(action: &str, skipped: usize) -> String {
    match skipped {
        0 => format!("Product {action}"),
        1 => format!("Product {action}. 1 image was skipped."),
        n => format!("Product {action}. {n} images were skipped."),
    }
}

/// GET /dashboard/products
#[instrument(skip_all)]
pub async fn index(
    session: ShopSession,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let products = ProductRepository::new(state.pool())
        .list(session.shop.id)
        .await?;
    let plan = current_plan(&state, session.shop.id).await?;
    let shell = ShellView::new(&state, &session, PRODUCTS_PATH);

    let limit_note = plan.product_limit().map_or_else(String::new, |limit| {
        format!("{} of {limit} products used", products.len())
    });

    Ok(render(&ProductsIndexTemplate {
        products: products
            .iter()
            .map(|p| ProductRowView::new(p, &session.shop, &shell.shop_url))
            .collect(),
        plan_name: plan.name(),
        limit_note,
        shell,
        flash,
    }))
}

/// GET /dashboard/products/new
#[instrument(skip_all)]
pub async fn new_product(
    session: ShopSession,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let categories = CategoryRepository::new(state.pool())
        .list(session.shop.id)
        .await?;

    Ok(render(&ProductNewTemplate {
        shell: ShellView::new(&state, &session, PRODUCTS_PATH),
        flash,
        form: ProductFormView::from_form(&ProductForm::default(), &categories),
        max_images: MAX_IMAGES_PER_UPLOAD,
    }))
}

/// POST /dashboard/products/new
#[instrument(skip_all, fields(product_id))]
pub async fn create(
    session: ShopSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let shop_id = session.shop.id;
    let products = ProductRepository::new(state.pool());

    let plan = current_plan(&state, shop_id).await?;
    if !plan.allows_another_product(products.count(shop_id).await?) {
        return Ok(redirect_error(PRODUCTS_PATH, &limit_message(plan)));
    }

    let submission =
        ProductSubmission::read(multipart, state.config().media.max_upload_bytes).await?;

    let input = match validate_submission(&state, shop_id, &submission.form).await? {
        Ok(input) => input,
        Err(message) => {
            let categories = CategoryRepository::new(state.pool()).list(shop_id).await?;
            return Ok(render(&ProductNewTemplate {
                shell: ShellView::new(&state, &session, PRODUCTS_PATH),
                flash: FlashQuery {
                    success: None,
                    error: Some(message),
                },
                form: ProductFormView::from_form(&submission.form, &categories),
                max_images: MAX_IMAGES_PER_UPLOAD,
            }));
        }
    };

    let product_id = match products.create(shop_id, &input).await {
        Ok(id) => id,
        Err(RepositoryError::Conflict(message)) => {
            return Ok(redirect_error(NEW_PRODUCT_PATH, &message));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::Span::current().record("product_id", tracing::field::display(product_id));

    let failed = store_images(&state, shop_id, product_id, &submission.uploads).await?;
    tracing::info!(
        images = submission.uploads.len() - failed,
        skipped = submission.skipped + failed,
        "Product created"
    );

    Ok(redirect_success(
        PRODUCTS_PATH,
        &saved_message("created", submission.skipped + failed),
    ))
}

/// GET /dashboard/products/{id}
#[instrument(skip(session, state, flash))]
pub async fn edit(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let shop_id = session.shop.id;
    let products = ProductRepository::new(state.pool());
    let product = products
        .get(shop_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;
    let images = products.images(shop_id, id).await?;
    let categories = CategoryRepository::new(state.pool()).list(shop_id).await?;

    Ok(render(&edit_template(
        &state, &session, &product, &images, &categories, flash,
    )))
}

fn edit_template(
    state: &AppState,
    session: &ShopSession,
    product: &Product,
    images: &[ProductImage],
    categories: &[Category],
    flash: FlashQuery,
) -> ProductEditTemplate {
    let shell = ShellView::new(state, session, PRODUCTS_PATH);
    let main_image = product.image_url.as_deref().unwrap_or_default();
    ProductEditTemplate {
        id: product.id.to_string(),
        view_url: format!("{}/product/{}", shell.shop_url, product.id),
        form: ProductFormView::from_product(product, categories),
        images: images
            .iter()
            .map(|image| ImageView {
                id: image.id.to_string(),
                url: image.image_url.clone(),
                is_main: image.image_url == main_image,
            })
            .collect(),
        max_images: MAX_IMAGES_PER_UPLOAD,
        shell,
        flash,
    }
}

/// POST /dashboard/products/{id}
#[instrument(skip(session, state, multipart))]
pub async fn update(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response> {
    let shop_id = session.shop.id;
    let edit_path = format!("{PRODUCTS_PATH}/{id}");
    let submission =
        ProductSubmission::read(multipart, state.config().media.max_upload_bytes).await?;

    let input = match validate_submission(&state, shop_id, &submission.form).await? {
        Ok(input) => input,
        Err(message) => return Ok(redirect_error(&edit_path, &message)),
    };

    match ProductRepository::new(state.pool())
        .update(shop_id, id, &input)
        .await
    {
        Ok(()) => {}
        Err(RepositoryError::NotFound) => {
            return Ok(redirect_error(PRODUCTS_PATH, "Product not found"));
        }
        Err(RepositoryError::Conflict(message)) => {
            return Ok(redirect_error(&edit_path, &message));
        }
        Err(e) => return Err(e.into()),
    }

    let failed = store_images(&state, shop_id, id, &submission.uploads).await?;
    tracing::info!(
        images = submission.uploads.len() - failed,
        skipped = submission.skipped + failed,
        "Product updated"
    );

    Ok(redirect_success(
        &edit_path,
        &saved_message("updated", submission.skipped + failed),
    ))
}

/// POST /dashboard/products/{id}/delete
#[instrument(skip(session, state))]
pub async fn delete(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let shop_id = session.shop.id;
    match ProductRepository::new(state.pool()).delete(shop_id, id).await {
        Ok(()) => {}
        Err(RepositoryError::NotFound) => {
            return Ok(redirect_error(PRODUCTS_PATH, "Product not found"));
        }
        Err(e) => return Err(e.into()),
    }

    if let Err(e) = state.media().delete_prefix(&product_prefix(shop_id, id)).await {
        tracing::warn!(error = %e, product_id = %id, "Failed to delete product images");
    }
    tracing::info!(product_id = %id, "Product deleted");

    Ok(redirect_success(PRODUCTS_PATH, "Product deleted"))
}

/// POST /dashboard/products/{id}/images/{image_id}/delete
#[instrument(skip(session, state))]
pub async fn delete_image(
    session: ShopSession,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(ProductId, ProductImageId)>,
) -> Result<Response> {
    let edit_path = format!("{PRODUCTS_PATH}/{id}");
    let image = match ProductRepository::new(state.pool())
        .delete_image(session.shop.id, id, image_id)
        .await
    {
        Ok(image) => image,
        Err(RepositoryError::NotFound) => {
            return Ok(redirect_error(&edit_path, "Image not found"));
        }
        Err(e) => return Err(e.into()),
    };

    if let Err(e) = state.media().delete(&image.storage_key).await {
        tracing::warn!(error = %e, key = %image.storage_key, "Failed to delete image file");
    }

    Ok(redirect_success(&edit_path, "Image removed"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use converty_core::CategoryId;

    use super::*;

    fn category(name: &str) -> Category {
        Category {
            id: CategoryId::generate(),
            shop_id: ShopId::generate(),
            name: name.to_string(),
            description: None,
            display_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_form_view_keeps_submitted_values() {
        let electronics = category("Electronics");
        let clothing = category("Clothing");
        let form = ProductForm {
            name: "Tee".to_string(),
            price: "abc".to_string(),
            category_id: clothing.id.to_string(),
            status: "draft".to_string(),
            ..ProductForm::default()
        };

        let view = ProductFormView::from_form(&form, &[electronics, clothing]);
        assert_eq!(view.name, "Tee");
        assert_eq!(view.price, "abc");
        assert!(!view.categories[0].selected);
        assert!(view.categories[1].selected);
        let selected: Vec<_> = view.statuses.iter().filter(|s| s.selected).collect();
        assert_eq!(selected.len(), 1);
        assert!(selected.iter().all(|s| s.value == "draft"));
    }

    #[test]
    fn test_status_defaults_to_published() {
        let options = status_options("");
        assert!(options.iter().any(|s| s.selected && s.value == "published"));
    }

    #[test]
    fn test_limit_message() {
        assert_eq!(
            limit_message(SubscriptionPlan::Free),
            "The Free plan allows up to 10 products. Upgrade to add more."
        );
        assert!(limit_message(SubscriptionPlan::Pro).contains("no product limit"));
    }

    #[test]
    fn test_saved_message() {
        assert_eq!(saved_message("created", 0), "Product created");
        assert_eq!(
            saved_message("updated", 1),
            "Product updated. 1 image was skipped."
        );
        assert_eq!(
            saved_message("created", 3),
            "Product created. 3 images were skipped."
        );
    }
}
