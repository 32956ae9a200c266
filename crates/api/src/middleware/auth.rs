//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a bearer-authenticated principal in
//! route handlers. The authorization predicate is cross-cutting: every
//! mutating or list-all operation requires a valid bearer credential
//! resolving to a known principal, and admin-only operations additionally
//! require the principal's admin flag.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires an authenticated principal.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Auth(AuthError::TokenMissing))?;
        let user = state.auth().resolve_principal(token).await?;
        Ok(Self(user))
    }
}

/// Extractor that requires an authenticated principal with the admin flag.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        ensure_admin(&user)?;
        Ok(Self(user))
    }
}

/// Extractor that optionally resolves the current principal.
///
/// Unlike [`RequireAuth`], this does not reject the request when no valid
/// credential is presented.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match bearer_token(parts) {
            Some(token) => state.auth().resolve_principal(token).await.ok(),
            None => None,
        };
        Ok(Self(user))
    }
}

/// The admin capability predicate.
///
/// # Errors
///
/// Returns `AppError::Authorization` when the principal's admin flag is not
/// set.
pub fn ensure_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Not authorized as an admin".to_owned(),
        ))
    }
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::IpAddr;
    use std::path::PathBuf;

    use axum::http::Request;
    use chrono::Utc;
    use secrecy::SecretString;

    use storefront_core::{Email, UserId};

    use crate::config::{ApiConfig, Environment};
    use crate::store::{MemoryStore, UserStore};

    use super::*;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/orders");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn test_state(store: MemoryStore) -> AppState {
        let config = ApiConfig {
            host: "127.0.0.1".parse::<IpAddr>().unwrap(),
            port: 4000,
            environment: Environment::Development,
            base_url: "http://localhost:3000".to_owned(),
            jwt_secret: SecretString::from("test-signing-secret-0123456789abcdef"),
            jwt_lifetime_hours: 1,
            upload_dir: PathBuf::from("uploads"),
            bootstrap_admin: None,
            paypal_client_id: None,
            stripe_secret_key: None,
            sentry_dsn: None,
        };
        AppState::new(config, store)
    }

    fn user(is_admin: bool) -> User {
        let now = Utc::now();
        User {
            id: UserId::generate(),
            name: "Test".to_owned(),
            email: Email::parse("test@example.com").unwrap(),
            password_hash: "hash".to_owned(),
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_ensure_admin_accepts_admin() {
        assert!(ensure_admin(&user(true)).is_ok());
    }

    #[test]
    fn test_ensure_admin_rejects_customer() {
        let err = ensure_admin(&user(false)).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let parts = parts_with_header(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));

        let parts = parts_with_header(Some("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&parts), None);

        let parts = parts_with_header(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[tokio::test]
    async fn test_require_auth_rejects_missing_token() {
        let state = test_state(MemoryStore::new());
        let mut parts = parts_with_header(None);

        let err = RequireAuth::from_request_parts(&mut parts, &state)
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::TokenMissing)));
    }

    #[tokio::test]
    async fn test_require_auth_resolves_principal() {
        let store = MemoryStore::new();
        let state = test_state(store);
        let (registered, token) = state
            .auth()
            .register("Alice", "alice@example.com", "s3cret-pw")
            .await
            .unwrap();

        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        let RequireAuth(principal) = RequireAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(principal.id, registered.id);
    }

    #[tokio::test]
    async fn test_require_admin_rejects_customer_credential() {
        let store = MemoryStore::new();
        let state = test_state(store);
        let (_, token) = state
            .auth()
            .register("Alice", "alice@example.com", "s3cret-pw")
            .await
            .unwrap();

        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        let err = RequireAdmin::from_request_parts(&mut parts, &state)
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_require_admin_accepts_admin_credential() {
        let store = MemoryStore::new();
        let state = test_state(store.clone());
        let (registered, _) = state
            .auth()
            .register("Root", "root@example.com", "s3cret-pw")
            .await
            .unwrap();

        let mut admin = UserStore::get(&store, registered.id).await.unwrap().unwrap();
        admin.is_admin = true;
        UserStore::update(&store, admin.clone()).await.unwrap();
        let token = state.auth().issue_credential(&admin).unwrap();

        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        let RequireAdmin(principal) = RequireAdmin::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(principal.is_admin);
    }

    #[tokio::test]
    async fn test_optional_auth_never_rejects() {
        let state = test_state(MemoryStore::new());

        let mut parts = parts_with_header(None);
        let OptionalAuth(none) = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(none.is_none());

        let mut parts = parts_with_header(Some("Bearer garbage"));
        let OptionalAuth(none) = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(none.is_none());
    }
}
