//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Liveness check
//!
//! # Users
//! POST   /users                  - Register
//! POST   /users/login            - Authenticate, returns bearer token
//! GET    /users/profile          - Own profile (principal)
//! PUT    /users/profile          - Update own profile (principal)
//! GET    /users                  - List users (admin)
//! DELETE /users/{id}             - Delete user (admin)
//! PUT    /users/{id}             - Toggle admin flag (admin)
//!
//! # Products
//! GET    /products               - Paginated/filtered catalog (public)
//! GET    /products/top           - Top 3 by rating (public)
//! GET    /products/{id}          - Product detail (public)
//! POST   /products               - Create sample product (admin)
//! PUT    /products/{id}          - Update product (admin)
//! DELETE /products/{id}          - Delete product (admin)
//! POST   /products/{id}/reviews  - Add review (principal)
//!
//! # Orders
//! POST   /orders                 - Create + pay order (principal)
//! GET    /orders                 - List all orders (admin)
//! GET    /orders/myorders        - List own orders (principal)
//! GET    /orders/{id}            - Fetch one order (principal)
//! PUT    /orders/{id}/pay        - Record payment confirmation (principal)
//! PUT    /orders/{id}/delivered  - Mark delivered (admin)
//! POST   /orders/checkout-session - Stripe checkout session (principal)
//!
//! # Misc
//! POST   /upload                 - Image upload (admin)
//! GET    /config/paypal          - PayPal client id (public)
//! ```

pub mod orders;
pub mod products;
pub mod upload;
pub mod users;

use axum::{
    Router,
    extract::State,
    routing::{delete, get, post, put},
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// Parse a path segment into a typed id, mapping failure to the same 404 the
/// store would produce for an unknown id.
pub(crate) fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("No item found with id: {raw}")))
}

/// Create the user routes router.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::register).get(users::list))
        .route("/users/login", post(users::login))
        .route(
            "/users/profile",
            get(users::profile).put(users::update_profile),
        )
        .route(
            "/users/{id}",
            delete(users::remove).put(users::set_admin),
        )
}

/// Create the product routes router.
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list).post(products::create))
        .route("/products/top", get(products::top))
        .route(
            "/products/{id}",
            get(products::detail)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/products/{id}/reviews", post(products::add_review))
}

/// Create the order routes router.
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::create).get(orders::list_all))
        .route("/orders/myorders", get(orders::mine))
        .route("/orders/checkout-session", post(orders::checkout_session))
        .route("/orders/{id}", get(orders::detail))
        .route("/orders/{id}/pay", put(orders::pay))
        .route("/orders/{id}/delivered", put(orders::deliver))
}

/// PayPal needs no server integration: hand the configured client id to the
/// frontend for its redirect flow.
async fn paypal_client_id(State(state): State<AppState>) -> String {
    state.config().paypal_client_id.clone().unwrap_or_default()
}

/// Create the complete API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(product_routes())
        .merge(order_routes())
        .route("/upload", post(upload::upload))
        .route("/config/paypal", get(paypal_client_id))
}
