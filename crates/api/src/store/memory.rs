//! In-memory store adapter.
//!
//! Collections live in `RwLock`-guarded vectors, which preserves natural
//! storage (insertion) order for list queries. Each trait method takes the
//! lock once, so every operation is atomic over its single document —
//! including [`ProductStore::append_review`], whose append-and-recompute runs
//! entirely under the write lock.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use storefront_core::{Email, OrderId, ProductId, UserId};

use super::{OrderStore, ProductStore, StoreError, StoreResult, UserStore};
use crate::models::{Order, Product, Review, User};

/// Thread-safe in-memory document store.
///
/// Cheap to clone; clones share the same underlying collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<Vec<User>>>,
    products: Arc<RwLock<Vec<Product>>>,
    orders: Arc<RwLock<Vec<Order>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().expect("RwLock poisoned");
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "Duplicate value entered for email field: {}",
                user.email
            )));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let users = self.users.read().expect("RwLock poisoned");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> StoreResult<Option<User>> {
        let users = self.users.read().expect("RwLock poisoned");
        Ok(users.iter().find(|u| &u.email == email).cloned())
    }

    async fn update(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().expect("RwLock poisoned");
        if users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "Duplicate value entered for email field: {}",
                user.email
            )));
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().expect("RwLock poisoned");
        Ok(users.clone())
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        let mut users = self.users.write().expect("RwLock poisoned");
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn insert(&self, product: Product) -> StoreResult<Product> {
        let mut products = self.products.write().expect("RwLock poisoned");
        products.push(product.clone());
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let products = self.products.read().expect("RwLock poisoned");
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, product: Product) -> StoreResult<Product> {
        let mut products = self.products.write().expect("RwLock poisoned");
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(StoreError::NotFound)?;
        *slot = product.clone();
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> StoreResult<bool> {
        let mut products = self.products.write().expect("RwLock poisoned");
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        let products = self.products.read().expect("RwLock poisoned");
        Ok(products.clone())
    }

    async fn append_review(&self, id: ProductId, review: Review) -> StoreResult<Product> {
        let mut products = self.products.write().expect("RwLock poisoned");
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;

        product
            .push_review(review)
            .map_err(|e| StoreError::Conflict(e.to_string()))?;

        Ok(product.clone())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: Order) -> StoreResult<Order> {
        let mut orders = self.orders.write().expect("RwLock poisoned");
        orders.push(order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn update(&self, order: Order) -> StoreResult<Order> {
        let mut orders = self.orders.write().expect("RwLock poisoned");
        let slot = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or(StoreError::NotFound)?;
        *slot = order.clone();
        Ok(order)
    }

    async fn list_by_user(&self, user: UserId) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        Ok(orders.iter().filter(|o| o.user == user).cloned().collect())
    }

    async fn list(&self) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().expect("RwLock poisoned");
        Ok(orders.clone())
    }
}
