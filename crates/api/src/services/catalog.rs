//! Catalog service: product CRUD, pagination, top products, and the review
//! aggregator.
//!
//! The review aggregator keeps two denormalized product fields
//! (`num_reviews`, `rating`) consistent with the review list by routing every
//! append through the store's atomic append-and-recompute update.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{ProductId, Rating, ReviewId};

use crate::error::AppError;
use crate::models::{Product, Review, User};
use crate::store::{ProductStore, StoreError};

/// Catalog page size, fixed.
const PAGE_SIZE: usize = 10;

/// Number of products returned by the top-rated query.
const TOP_LIMIT: usize = 3;

/// One page of the catalog.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: u32,
    pub pages: u32,
}

/// Full set of updatable product fields; a product update overwrites all of
/// them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub count_in_stock: u32,
}

/// Catalog service.
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductStore>,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// One page of products, optionally filtered by a case-insensitive
    /// substring match on the name. Page numbering is 1-based; out-of-range
    /// pages return an empty product list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store operation fails.
    pub async fn list(&self, keyword: Option<&str>, page: Option<u32>) -> Result<ProductPage, AppError> {
        let page = page.unwrap_or(1).max(1);

        let matching: Vec<Product> = match keyword.filter(|k| !k.is_empty()) {
            Some(keyword) => {
                let needle = keyword.to_lowercase();
                self.products
                    .list()
                    .await?
                    .into_iter()
                    .filter(|p| p.name.to_lowercase().contains(&needle))
                    .collect()
            }
            None => self.products.list().await?,
        };

        let pages = u32::try_from(matching.len().div_ceil(PAGE_SIZE)).unwrap_or(u32::MAX);
        let products = matching
            .into_iter()
            .skip(PAGE_SIZE * (page as usize - 1))
            .take(PAGE_SIZE)
            .collect();

        Ok(ProductPage {
            products,
            page,
            pages,
        })
    }

    /// The top rated products: at most three, rating descending, ties broken
    /// by natural storage order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store operation fails.
    pub async fn top_products(&self) -> Result<Vec<Product>, AppError> {
        let mut products = self.products.list().await?;
        // Stable sort keeps storage order within equal ratings.
        products.sort_by(|a, b| b.rating.cmp(&a.rating));
        products.truncate(TOP_LIMIT);
        Ok(products)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no such product.
    pub async fn get(&self, id: ProductId) -> Result<Product, AppError> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
    }

    // =========================================================================
    // Admin Mutations
    // =========================================================================

    /// Create a placeholder product owned by the given admin, to be filled in
    /// via [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store operation fails.
    pub async fn create_sample(&self, admin: &User) -> Result<Product, AppError> {
        let now = Utc::now();
        let product = Product {
            id: ProductId::generate(),
            user: admin.id,
            name: "Sample name".to_owned(),
            image: "/images/sample.jpg".to_owned(),
            brand: "Sample brand".to_owned(),
            category: "Sample category".to_owned(),
            description: "Sample description".to_owned(),
            rating: Decimal::ZERO,
            num_reviews: 0,
            price: Decimal::ZERO,
            count_in_stock: 0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        Ok(self.products.insert(product).await?)
    }

    /// Overwrite a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no such product.
    pub async fn update(&self, id: ProductId, update: ProductUpdate) -> Result<Product, AppError> {
        let mut product = self.get(id).await?;

        product.name = update.name;
        product.price = update.price;
        product.description = update.description;
        product.image = update.image;
        product.brand = update.brand;
        product.category = update.category;
        product.count_in_stock = update.count_in_stock;
        product.updated_at = Utc::now();

        Ok(self.products.update(product).await?)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no such product.
    pub async fn delete(&self, id: ProductId) -> Result<(), AppError> {
        if self.products.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Product not found".to_owned()))
        }
    }

    // =========================================================================
    // Review Aggregator
    // =========================================================================

    /// Append a review by `principal` and recompute the product's rating
    /// aggregate. One review per (product, author).
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is absent and
    /// `AppError::Validation` ("Product already reviewed") on a duplicate
    /// author.
    pub async fn add_review(
        &self,
        principal: &User,
        product_id: ProductId,
        rating: Rating,
        comment: String,
    ) -> Result<Product, AppError> {
        let review = Review {
            id: ReviewId::generate(),
            user: principal.id,
            name: principal.name.clone(),
            rating,
            comment,
            created_at: Utc::now(),
        };

        self.products
            .append_review(product_id, review)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AppError::NotFound("Product not found".to_owned()),
                StoreError::Conflict(msg) => AppError::Validation(msg),
                other => AppError::Store(other),
            })
    }
}
