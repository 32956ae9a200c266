//! Document store access for the storefront.
//!
//! The backing store is treated as a black-box document store: key/value by
//! id, a unique index on user email, and query-by-filter. Each collection is
//! reached through a trait so the adapter can be swapped without touching the
//! services; services receive their store handles at construction time rather
//! than through ambient globals.
//!
//! Every operation is a single read-modify-write against one document. The
//! review append is special-cased as [`ProductStore::append_review`] so the
//! adapter can run the append-and-recompute atomically, which removes the
//! lost-update race on the product's derived rating fields.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use storefront_core::{Email, OrderId, ProductId, UserId};

use crate::models::{Order, Product, Review, User};

pub use memory::MemoryStore;

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document for the given id.
    #[error("document not found")]
    NotFound,

    /// A unique index was violated, or a single-document precondition failed.
    #[error("{0}")]
    Conflict(String),

    /// The adapter failed internally (connection loss, corrupt document).
    #[error("store failure: {0}")]
    Backend(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// User collection, with a unique index on email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already registered.
    async fn insert(&self, user: User) -> StoreResult<User>;

    /// Fetch a user by id.
    async fn get(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Fetch a user by the unique email index.
    async fn get_by_email(&self, email: &Email) -> StoreResult<Option<User>>;

    /// Overwrite an existing user document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist, and
    /// `StoreError::Conflict` if the new email belongs to another user.
    async fn update(&self, user: User) -> StoreResult<User>;

    /// All users in natural storage order.
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Delete a user. Returns `true` if a document was removed.
    async fn delete(&self, id: UserId) -> StoreResult<bool>;
}

/// Product collection.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product.
    async fn insert(&self, product: Product) -> StoreResult<Product>;

    /// Fetch a product by id.
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Overwrite an existing product document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the product does not exist.
    async fn update(&self, product: Product) -> StoreResult<Product>;

    /// Delete a product. Returns `true` if a document was removed.
    async fn delete(&self, id: ProductId) -> StoreResult<bool>;

    /// All products in natural storage order.
    async fn list(&self) -> StoreResult<Vec<Product>>;

    /// Atomically append a review and recompute the product's derived
    /// `num_reviews`/`rating` fields in a single document update.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the product does not exist, and
    /// `StoreError::Conflict` if the author already reviewed the product.
    async fn append_review(&self, id: ProductId, review: Review) -> StoreResult<Product>;
}

/// Order collection.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order.
    async fn insert(&self, order: Order) -> StoreResult<Order>;

    /// Fetch an order by id.
    async fn get(&self, id: OrderId) -> StoreResult<Option<Order>>;

    /// Overwrite an existing order document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the order does not exist.
    async fn update(&self, order: Order) -> StoreResult<Order>;

    /// All orders owned by a principal, in natural storage order.
    async fn list_by_user(&self, user: UserId) -> StoreResult<Vec<Order>>;

    /// Every order in the system, in natural storage order.
    async fn list(&self) -> StoreResult<Vec<Order>>;
}
