//! Product route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use storefront_core::{ProductId, Rating};

use crate::error::{Json, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::Product;
use crate::services::catalog::{ProductPage, ProductUpdate};
use crate::state::AppState;

use super::{MessageResponse, parse_id};

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub keyword: Option<String>,
    pub page: Option<u32>,
}

/// Review request body.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: Rating,
    #[serde(default)]
    pub comment: String,
}

/// `GET /products?keyword=&page=` - one page of the catalog (public).
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<ProductPage>> {
    let page = state
        .catalog()
        .list(query.keyword.as_deref(), query.page)
        .await?;
    Ok(Json(page))
}

/// `GET /products/top` - top rated products (public).
pub async fn top(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().top_products().await?))
}

/// `GET /products/{id}` - product detail (public).
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id)?;
    Ok(Json(state.catalog().get(id).await?))
}

/// `POST /products` - create a placeholder product (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog().create_sample(&admin).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}` - overwrite a product's fields (admin).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id)?;
    Ok(Json(state.catalog().update(id, body).await?))
}

/// `DELETE /products/{id}` - delete a product (admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id: ProductId = parse_id(&id)?;
    state.catalog().delete(id).await?;
    Ok(Json(MessageResponse::new("Product has been removed")))
}

/// `POST /products/{id}/reviews` - add a review (principal).
pub async fn add_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(body): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let id: ProductId = parse_id(&id)?;
    state
        .catalog()
        .add_review(&user, id, body.rating, body.comment)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Review added")),
    ))
}
