//! Product and review domain types.
//!
//! A product carries two denormalized fields (`num_reviews`, `rating`) that
//! must always agree with its review list. The only mutation path for the
//! review list is [`Product::push_review`], which recomputes both; the store
//! adapter runs it inside a single-document atomic update.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::{ProductId, Rating, ReviewId, UserId};

/// Error appending a review to a product.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// The author already reviewed this product.
    #[error("Product already reviewed")]
    AlreadyReviewed,
}

/// A customer review, immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// Author reference.
    pub user: UserId,
    /// Author display name, snapshotted at creation.
    pub name: String,
    /// Star rating, 1-5.
    pub rating: Rating,
    /// Free-text comment.
    pub comment: String,
    /// When the review was created.
    pub created_at: DateTime<Utc>,
}

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Creating admin.
    pub user: UserId,
    /// Product name.
    pub name: String,
    /// Image path (served from `/uploads` or `/images`).
    pub image: String,
    /// Brand label.
    pub brand: String,
    /// Category label.
    pub category: String,
    /// Long description.
    pub description: String,
    /// Derived rating: mean of review ratings, 0 when unreviewed.
    pub rating: Decimal,
    /// Derived review count, always `reviews.len()`.
    pub num_reviews: u32,
    /// Unit price.
    pub price: Decimal,
    /// Units in stock.
    pub count_in_stock: u32,
    /// Reviews in creation order, append-only.
    pub reviews: Vec<Review>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Append a review and recompute the derived `num_reviews`/`rating`
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::AlreadyReviewed`] if the review's author
    /// already has a review on this product; the product is left untouched.
    pub fn push_review(&mut self, review: Review) -> Result<(), ReviewError> {
        if self.reviews.iter().any(|r| r.user == review.user) {
            return Err(ReviewError::AlreadyReviewed);
        }

        self.reviews.push(review);
        self.recompute_rating();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Recompute `num_reviews` and `rating` from the review list.
    fn recompute_rating(&mut self) {
        self.num_reviews = u32::try_from(self.reviews.len()).unwrap_or(u32::MAX);
        self.rating = if self.reviews.is_empty() {
            Decimal::ZERO
        } else {
            let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating.as_u8())).sum();
            Decimal::from(sum) / Decimal::from(self.reviews.len() as u64)
        };
    }
}
