//! Order API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{NewOrder, OrderStatus};
use crate::db::repository::{order as order_repo, pricing, sequence};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_number: String,
    pub total_amount: f64,
}

/// Checkout: allocate an order number and persist the order with its items
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<NewOrder>,
) -> AppResult<Json<CreateOrderResponse>> {
    if payload.items.is_empty() {
        return Err(AppError::validation("Order must contain at least one item"));
    }
    if payload.customer_email.trim().is_empty() {
        return Err(AppError::validation("Customer email is required"));
    }

    // Reprice print lines server-side; client-submitted prices are only
    // trusted for lines without a catalog size
    for item in &mut payload.items {
        if item.quantity <= 0 {
            return Err(AppError::validation("Item quantity must be positive"));
        }
        if let Some(size_id) = item.print_size_id {
            let unit = pricing::unit_price(&state.db.pool, size_id, item.quantity).await?;
            item.price = unit;
            item.subtotal = unit * item.quantity as f64;
        }
    }

    let total_amount: f64 = payload.items.iter().map(|item| item.subtotal).sum();
    let order_number = sequence::allocate(&state.db.pool).await;

    let order = order_repo::create_with_items(
        &state.db.pool,
        &order_number,
        OrderStatus::Pending,
        &payload,
        total_amount,
    )
    .await?;

    tracing::info!(
        order_number = %order.order_number,
        items = payload.items.len(),
        total = total_amount,
        "Order created"
    );

    Ok(Json(CreateOrderResponse {
        success: true,
        order_number: order.order_number,
        total_amount,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLookupRequest {
    pub email: String,
    pub order_number: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusItem {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub subtotal: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLookupResponse {
    pub order_number: String,
    pub status: String,
    pub created_at: i64,
    pub total_amount: f64,
    pub delivery_method: String,
    pub items: Vec<StatusItem>,
}

/// Customer order status lookup by number + email.
///
/// A wrong email returns the same 404 as a missing order so the endpoint
/// cannot be used to probe which order numbers exist.
pub async fn status_lookup(
    State(state): State<ServerState>,
    Json(payload): Json<StatusLookupRequest>,
) -> AppResult<Json<StatusLookupResponse>> {
    if payload.email.trim().is_empty() || payload.order_number.trim().is_empty() {
        return Err(AppError::validation("Email/Order Number required"));
    }

    let order = order_repo::find_by_number(&state.db.pool, payload.order_number.trim()).await?;

    let order = match order {
        Some(order)
            if order.customer_email.trim().eq_ignore_ascii_case(payload.email.trim()) =>
        {
            order
        }
        _ => return Err(AppError::not_found("Order not found")),
    };

    let items = order_repo::items_for_order(&state.db.pool, order.id)
        .await?
        .into_iter()
        .map(|item| StatusItem {
            id: item.id,
            name: item.name,
            quantity: item.quantity,
            subtotal: item.subtotal,
        })
        .collect();

    Ok(Json(StatusLookupResponse {
        order_number: order.order_number,
        status: order.status,
        created_at: order.created_at,
        total_amount: order.total_amount,
        delivery_method: order.delivery_method,
        items,
    }))
}
