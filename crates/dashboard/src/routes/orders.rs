//! Order list, detail, status changes and the manual order builder.
//!
//! The manual order's lines live in the session under
//! [`session_keys::ORDER_DRAFT`] until the merchant submits the customer form.

#![allow(clippy::used_underscore_binding)]

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use converty_core::{OrderId, OrderStatus, ProductId, ProductStatus};

use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::ShopSession;
use crate::models::{ManualOrderForm, OrderDraft, OrderWithItems, Shop, session_keys};
use crate::state::AppState;

use super::{FlashQuery, ShellView, redirect_error, redirect_success, render};

const ORDERS_PATH: &str = "/dashboard/orders";
const NEW_ORDER_PATH: &str = "/dashboard/orders/new";
const ORDER_TOO_LARGE: &str = "Order total is larger than a single order can hold";

/// CSS class for a status badge.
#[must_use]
pub const fn status_class(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "badge badge-pending",
        OrderStatus::Confirmed => "badge badge-confirmed",
        OrderStatus::Shipped => "badge badge-shipped",
        OrderStatus::Completed => "badge badge-completed",
        OrderStatus::Cancelled => "badge badge-cancelled",
    }
}

/// One `<option>` of a status select.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn status_options(current: Option<OrderStatus>) -> Vec<StatusOption> {
    OrderStatus::ALL
        .iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            label: status.label(),
            selected: current == Some(*status),
        })
        .collect()
}

/// Order row for tables.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: String,
    pub number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub item_summary: String,
    pub total: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub status_options: Vec<StatusOption>,
    pub created_at: String,
}

impl OrderRowView {
    #[must_use]
    pub fn new(order: &OrderWithItems, shop: &Shop) -> Self {
        let id = order.order.id.to_string();
        Self {
            number: order_number(&id),
            id,
            customer_name: order.order.customer_name.clone(),
            customer_phone: order.order.customer_phone.clone().unwrap_or_default(),
            item_summary: order.item_summary(),
            total: shop.format_price(order.order.total_amount),
            status_label: order.order.status.label(),
            status_class: status_class(order.order.status),
            status_options: status_options(Some(order.order.status)),
            created_at: order.order.created_at.format("%b %d, %Y %H:%M").to_string(),
        }
    }
}

/// Short display number: the first eight hex digits of the id.
fn order_number(id: &str) -> String {
    format!("#{}", id.chars().take(8).collect::<String>().to_uppercase())
}

/// Order line for the detail page.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub orders: Vec<OrderRowView>,
    pub filter_options: Vec<StatusOption>,
    pub filter_all: bool,
}

#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub order: OrderRowView,
    pub customer_email: String,
    pub customer_city: String,
    pub customer_address: String,
    pub customer_notes: String,
    pub payment_method: &'static str,
    pub lines: Vec<OrderLineView>,
}

/// Product offered in the manual order builder.
#[derive(Debug, Clone)]
pub struct ProductOption {
    pub id: String,
    pub label: String,
}

/// Draft line shown in the manual order builder.
#[derive(Debug, Clone)]
pub struct DraftLineView {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

#[derive(Template)]
#[template(path = "orders/new.html")]
pub struct NewOrderTemplate {
    pub shell: ShellView,
    pub flash: FlashQuery,
    pub products: Vec<ProductOption>,
    pub lines: Vec<DraftLineView>,
    pub total: String,
    pub status_options: Vec<StatusOption>,
}

/// `?status=` filter of the order list.
#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
}

impl OrderFilter {
    /// Blank, `all` or unknown values show every order.
    fn status(&self) -> Option<OrderStatus> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty() && *s != "all")
            .and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    pub return_to: Option<String>,
}

impl StatusForm {
    /// Where to go after the change; only order pages are accepted.
    fn return_path(&self, id: OrderId) -> String {
        match self.return_to.as_deref() {
            Some(path) if path == ORDERS_PATH || path.starts_with("/dashboard/orders?") => {
                path.to_string()
            }
            _ => format!("{ORDERS_PATH}/{id}"),
        }
    }
}

async fn load_draft(session: &Session) -> Result<OrderDraft> {
    Ok(session
        .get::<OrderDraft>(session_keys::ORDER_DRAFT)
        .await?
        .unwrap_or_default())
}

/// GET /dashboard/orders
#[instrument(skip_all)]
pub async fn index(
    session: ShopSession,
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let status = filter.status();
    let orders = OrderRepository::new(state.pool())
        .list(session.shop.id, status)
        .await?;

    Ok(render(&OrdersIndexTemplate {
        shell: ShellView::new(&state, &session, ORDERS_PATH),
        flash,
        orders: orders
            .iter()
            .map(|o| OrderRowView::new(o, &session.shop))
            .collect(),
        filter_options: status_options(status),
        filter_all: status.is_none(),
    }))
}

/// GET /dashboard/orders/{id}
#[instrument(skip(session, state, flash))]
pub async fn show(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let order = OrderRepository::new(state.pool())
        .get(session.shop.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;

    let shop = &session.shop;
    let lines = order
        .items
        .iter()
        .map(|item| OrderLineView {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: shop.format_price(item.unit_price),
            subtotal: shop.format_price(item.subtotal),
        })
        .collect();

    Ok(render(&OrderShowTemplate {
        shell: ShellView::new(&state, &session, ORDERS_PATH),
        flash,
        customer_email: order.order.customer_email.clone().unwrap_or_default(),
        customer_city: order.order.customer_city.clone().unwrap_or_default(),
        customer_address: order.order.customer_address.clone().unwrap_or_default(),
        customer_notes: order.order.customer_notes.clone().unwrap_or_default(),
        payment_method: order.order.payment_method.label(),
        order: OrderRowView::new(&order, shop),
        lines,
    }))
}

/// POST /dashboard/orders/{id}/status
#[instrument(skip(session, state, form))]
pub async fn update_status(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let back = form.return_path(id);
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        return Ok(redirect_error(&back, "Unknown order status"));
    };

    match OrderRepository::new(state.pool())
        .update_status(session.shop.id, id, status)
        .await
    {
        Ok(()) => {
            tracing::info!(order_id = %id, status = %status, "Order status updated");
            Ok(redirect_success(
                &back,
                &format!("Order marked as {}", status.label()),
            ))
        }
        Err(RepositoryError::NotFound) => Ok(redirect_error(ORDERS_PATH, "Order not found")),
        Err(e) => Err(e.into()),
    }
}

/// POST /dashboard/orders/{id}/delete
#[instrument(skip(session, state))]
pub async fn delete(
    session: ShopSession,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    match OrderRepository::new(state.pool())
        .delete(session.shop.id, id)
        .await
    {
        Ok(()) => {
            tracing::info!(order_id = %id, "Order deleted");
            Ok(redirect_success(ORDERS_PATH, "Order deleted"))
        }
        Err(RepositoryError::NotFound) => Ok(redirect_error(ORDERS_PATH, "Order not found")),
        Err(e) => Err(e.into()),
    }
}

/// GET /dashboard/orders/new
#[instrument(skip_all)]
pub async fn new_order(
    session: ShopSession,
    State(state): State<AppState>,
    http_session: Session,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let shop = &session.shop;
    let products = ProductRepository::new(state.pool())
        .list_published(shop.id)
        .await?;
    let draft = load_draft(&http_session).await?;

    let products = products
        .iter()
        .filter(|p| p.in_stock())
        .map(|p| ProductOption {
            id: p.id.to_string(),
            label: format!(
                "{} ({}, {} in stock)",
                p.name,
                shop.format_price(p.price),
                p.quantity
            ),
        })
        .collect();
    let lines = draft
        .lines
        .iter()
        .map(|line| DraftLineView {
            product_id: line.product_id.to_string(),
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: shop.format_price(line.unit_price),
            subtotal: shop.format_price(line.subtotal()),
        })
        .collect();

    Ok(render(&NewOrderTemplate {
        shell: ShellView::new(&state, &session, ORDERS_PATH),
        flash,
        products,
        lines,
        total: shop.format_price(draft.total()),
        status_options: status_options(Some(OrderStatus::default())),
    }))
}

/// POST /dashboard/orders/new/items
#[instrument(skip(session, state, http_session, form))]
pub async fn add_item(
    session: ShopSession,
    State(state): State<AppState>,
    http_session: Session,
    Form(form): Form<AddItemForm>,
) -> Result<Response> {
    let product = ProductRepository::new(state.pool())
        .get(session.shop.id, form.product_id)
        .await?
        .filter(|p| p.status == ProductStatus::Published);
    let Some(product) = product else {
        return Ok(redirect_error(NEW_ORDER_PATH, "Product not found"));
    };

    let Ok(quantity) = form.quantity.trim().parse::<i32>() else {
        return Ok(redirect_error(NEW_ORDER_PATH, "Quantity must be a whole number"));
    };

    let mut draft = load_draft(&http_session).await?;
    if let Err(e) = draft.add(&product, quantity) {
        return Ok(redirect_error(NEW_ORDER_PATH, &e.0));
    }
    http_session
        .insert(session_keys::ORDER_DRAFT, &draft)
        .await?;

    Ok(redirect_success(
        NEW_ORDER_PATH,
        &format!("Added {} x{quantity}", product.name),
    ))
}

/// POST /dashboard/orders/new/items/{product_id}/remove
#[instrument(skip(_session, http_session))]
pub async fn remove_item(
    _session: ShopSession,
    http_session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<Response> {
    let mut draft = load_draft(&http_session).await?;
    draft.remove(product_id);
    http_session
        .insert(session_keys::ORDER_DRAFT, &draft)
        .await?;

    Ok(redirect_success(NEW_ORDER_PATH, "Item removed"))
}

/// POST /dashboard/orders/new
#[instrument(skip(session, state, http_session, form))]
pub async fn create(
    session: ShopSession,
    State(state): State<AppState>,
    http_session: Session,
    Form(form): Form<ManualOrderForm>,
) -> Result<Response> {
    let draft = load_draft(&http_session).await?;
    let order = match form.validate(&draft) {
        Ok(order) => order,
        Err(e) => return Ok(redirect_error(NEW_ORDER_PATH, &e.0)),
    };

    match OrderRepository::new(state.pool())
        .create_manual(session.shop.id, &order)
        .await
    {
        Ok(order_id) => {
            http_session
                .remove::<OrderDraft>(session_keys::ORDER_DRAFT)
                .await?;
            tracing::info!(order_id = %order_id, lines = order.lines.len(), "Manual order created");
            Ok(redirect_success(
                &format!("{ORDERS_PATH}/{order_id}"),
                "Order created",
            ))
        }
        Err(RepositoryError::InsufficientStock { product, available }) => Ok(redirect_error(
            NEW_ORDER_PATH,
            &format!("Only {available} of {product} left in stock"),
        )),
        Err(RepositoryError::NotFound) => Ok(redirect_error(
            NEW_ORDER_PATH,
            "A product in this order no longer exists",
        )),
        Err(RepositoryError::TotalTooLarge) => Ok(redirect_error(NEW_ORDER_PATH, ORDER_TOO_LARGE)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_filter() {
        let filter = |s: Option<&str>| OrderFilter {
            status: s.map(String::from),
        };
        assert_eq!(filter(None).status(), None);
        assert_eq!(filter(Some("all")).status(), None);
        assert_eq!(filter(Some("")).status(), None);
        assert_eq!(filter(Some("bogus")).status(), None);
        assert_eq!(filter(Some("shipped")).status(), Some(OrderStatus::Shipped));
    }

    #[test]
    fn test_status_options_mark_selected() {
        let options = status_options(Some(OrderStatus::Completed));
        assert_eq!(options.len(), OrderStatus::ALL.len());
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert!(selected.iter().all(|o| o.value == "completed"));
    }

    #[test]
    fn test_return_path_only_allows_order_pages() {
        let id = OrderId::generate();
        let form = |to: Option<&str>| StatusForm {
            status: "shipped".to_string(),
            return_to: to.map(String::from),
        };

        assert_eq!(form(None).return_path(id), format!("/dashboard/orders/{id}"));
        assert_eq!(form(Some("/dashboard/orders")).return_path(id), "/dashboard/orders");
        assert_eq!(
            form(Some("/dashboard/orders?status=pending")).return_path(id),
            "/dashboard/orders?status=pending"
        );
        assert_eq!(
            form(Some("https://evil.example")).return_path(id),
            format!("/dashboard/orders/{id}")
        );
    }

    #[test]
    fn test_order_number() {
        assert_eq!(
            order_number("3f2a9c1e-0000-4000-8000-000000000000"),
            "#3F2A9C1E"
        );
    }
}
