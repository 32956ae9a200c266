//! Order route handlers.
//!
//! Fetching a single order requires only an authenticated principal, not
//! ownership: any logged-in user may fetch any order by id. This matches the
//! public API contract.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use storefront_core::{Email, OrderId};

use crate::error::{AppError, Json, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Order, PaymentResult};
use crate::services::orders::{OrderDraft, OrderWithOwner};
use crate::services::payments::{CheckoutDraft, CheckoutItem, CheckoutSession};
use crate::state::AppState;

use super::parse_id;

/// Checkout session request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart_items: Vec<CheckoutItem>,
    #[serde(rename = "customer_email")]
    pub customer_email: String,
}

/// `POST /orders` - create an order, immediately recorded as paid
/// (principal).
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.orders().create_order(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders` - every order, annotated with owner profiles (admin).
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<OrderWithOwner>>> {
    Ok(Json(state.orders().list_all_orders().await?))
}

/// `GET /orders/myorders` - the principal's own orders.
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_orders_for(user.id).await?))
}

/// `GET /orders/{id}` - one order with its owner's profile (principal).
pub async fn detail(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<OrderWithOwner>> {
    let id: OrderId = parse_id(&id)?;
    Ok(Json(state.orders().get_order(id).await?))
}

/// `PUT /orders/{id}/pay` - record a payment confirmation (principal).
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
    Json(confirmation): Json<PaymentResult>,
) -> Result<Json<Order>> {
    let id: OrderId = parse_id(&id)?;
    Ok(Json(state.orders().mark_paid(id, confirmation).await?))
}

/// `PUT /orders/{id}/delivered` - mark an order delivered (admin).
pub async fn deliver(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let id: OrderId = parse_id(&id)?;
    Ok(Json(state.orders().mark_delivered(id).await?))
}

/// `POST /orders/checkout-session` - create a provider-hosted checkout and
/// return its redirect URL (principal).
pub async fn checkout_session(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSession>> {
    let gateway = state
        .gateway()
        .ok_or_else(|| AppError::Internal("payment gateway is not configured".to_owned()))?;

    let customer_email = Email::parse(&body.customer_email)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = gateway
        .create_checkout_session(CheckoutDraft {
            items: body.cart_items,
            customer_email,
        })
        .await?;

    Ok(Json(session))
}
