//! User route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use storefront_core::{Email, UserId};

use crate::error::{Json, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::UserProfile;
use crate::services::auth::ProfileUpdate;
use crate::state::AppState;

use super::{MessageResponse, parse_id};

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Profile plus a fresh bearer credential, returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub token: String,
}

/// Admin request to overwrite a user's admin flag.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

/// `POST /users` - register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let (user, token) = state
        .auth()
        .register(&body.name, &body.email, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            is_admin: user.is_admin,
            token,
        }),
    ))
}

/// `POST /users/login` - authenticate and issue a bearer credential.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let (user, token) = state.auth().authenticate(&body.email, &body.password).await?;

    Ok(Json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        is_admin: user.is_admin,
        token,
    }))
}

/// `GET /users/profile` - the principal's own profile.
pub async fn profile(RequireAuth(user): RequireAuth) -> Json<UserProfile> {
    Json(user.profile())
}

/// `PUT /users/profile` - update the principal's own profile.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    let updated = state.auth().update_profile(user, update).await?;
    Ok(Json(updated.profile()))
}

/// `GET /users` - all users (admin).
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserProfile>>> {
    let users = state.auth().list_users().await?;
    Ok(Json(users.iter().map(crate::models::User::profile).collect()))
}

/// `DELETE /users/{id}` - delete a user (admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id: UserId = parse_id(&id)?;
    state.auth().delete_user(id).await?;
    Ok(Json(MessageResponse::new("User has been removed")))
}

/// `PUT /users/{id}` - overwrite a user's admin flag (admin).
pub async fn set_admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<SetAdminRequest>,
) -> Result<Json<MessageResponse>> {
    let id: UserId = parse_id(&id)?;
    state.auth().set_admin(id, body.is_admin).await?;
    Ok(Json(MessageResponse::new("User has been updated")))
}
