//! Order lifecycle service.
//!
//! Computes nothing: price fields arrive from the client as snapshots and are
//! deliberately trusted rather than recomputed from the live catalog, so a
//! stored order's totals never drift when catalog prices change. The trust
//! decision is isolated behind [`PricingPolicy`] so a stricter verification
//! mode can be added without touching the transition logic.
//!
//! Authorization (who may call which operation) is applied by the route
//! layer's extractors, not here; in particular any authenticated principal
//! may fetch any order by id, matching the public API contract.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{OrderId, UserId};

use crate::error::AppError;
use crate::models::{Order, OrderItem, OwnerProfile, PaymentResult, ShippingAddress, User};
use crate::store::{OrderStore, UserStore};

/// Client-submitted order, validated at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub order_items: Vec<OrderItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: String,
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
    /// Confirmation from the payment provider, recorded as-is.
    pub payment_result: Option<PaymentResult>,
}

/// An order annotated with its owner's public profile.
///
/// `owner` is `None` when the owning account has since been deleted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithOwner {
    #[serde(flatten)]
    pub order: Order,
    pub owner: Option<OwnerProfile>,
}

/// Verification hook for client-supplied price fields.
///
/// The default [`TrustClient`] accepts whatever the client sent, preserving
/// the source system's behavior; a stricter implementation can reject drafts
/// whose totals do not add up without any change to the lifecycle logic.
pub trait PricingPolicy: Send + Sync {
    /// Check a draft's price fields.
    ///
    /// # Errors
    ///
    /// Returns a message describing the rejection, surfaced as a validation
    /// failure.
    fn verify(&self, draft: &OrderDraft) -> Result<(), String>;
}

/// The compatibility policy: client-supplied totals are accepted unchecked.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustClient;

impl PricingPolicy for TrustClient {
    fn verify(&self, _draft: &OrderDraft) -> Result<(), String> {
        Ok(())
    }
}

/// Order lifecycle service.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    pricing: Arc<dyn PricingPolicy>,
}

impl OrderService {
    /// Create a new order service with the default trusting pricing policy.
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>, users: Arc<dyn UserStore>) -> Self {
        Self::with_pricing(orders, users, Arc::new(TrustClient))
    }

    /// Create a new order service with an explicit pricing policy.
    #[must_use]
    pub fn with_pricing(
        orders: Arc<dyn OrderStore>,
        users: Arc<dyn UserStore>,
        pricing: Arc<dyn PricingPolicy>,
    ) -> Self {
        Self {
            orders,
            users,
            pricing,
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create an order owned by `principal`, immediately recorded as paid
    /// with the supplied confirmation and `paid_at` set to the creation time.
    ///
    /// Nothing is persisted on a rejected draft.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` ("No order items") for an empty cart,
    /// for a zero quantity line item, or when the pricing policy rejects the
    /// draft.
    pub async fn create_order(&self, principal: &User, draft: OrderDraft) -> Result<Order, AppError> {
        if draft.order_items.is_empty() {
            return Err(AppError::Validation("No order items".to_owned()));
        }
        if draft.order_items.iter().any(|item| item.qty == 0) {
            return Err(AppError::Validation(
                "Order item quantity must be at least 1".to_owned(),
            ));
        }
        self.pricing.verify(&draft).map_err(AppError::Validation)?;

        let now = Utc::now();
        let order = Order {
            id: OrderId::generate(),
            user: principal.id,
            order_items: draft.order_items,
            shipping_address: draft.shipping_address,
            payment_method: draft.payment_method,
            items_price: draft.items_price,
            shipping_price: draft.shipping_price,
            tax_price: draft.tax_price,
            total_price: draft.total_price,
            is_paid: true,
            payment_result: draft.payment_result,
            paid_at: Some(now),
            is_delivered: false,
            delivered_at: None,
            created_at: now,
        };

        let order = self.orders.insert(order).await?;
        tracing::info!(order_id = %order.id, user_id = %principal.id, "order created");
        Ok(order)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fetch one order, annotated with the owner's public profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no such order.
    pub async fn get_order(&self, id: OrderId) -> Result<OrderWithOwner, AppError> {
        let order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

        let owner = self
            .users
            .get(order.user)
            .await?
            .map(|user| user.owner_profile());

        Ok(OrderWithOwner { order, owner })
    }

    /// All orders owned by `user`, in natural storage order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store operation fails.
    pub async fn list_orders_for(&self, user: UserId) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.list_by_user(user).await?)
    }

    /// Every order in the system, each annotated with its owner's profile.
    /// Admin-only at the boundary.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the store operation fails.
    pub async fn list_all_orders(&self) -> Result<Vec<OrderWithOwner>, AppError> {
        let orders = self.orders.list().await?;

        let mut annotated = Vec::with_capacity(orders.len());
        for order in orders {
            let owner = self
                .users
                .get(order.user)
                .await?
                .map(|user| user.owner_profile());
            annotated.push(OrderWithOwner { order, owner });
        }
        Ok(annotated)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Record a payment confirmation against an order.
    ///
    /// Not idempotent: a repeat call overwrites `paid_at` and the stored
    /// confirmation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no such order.
    pub async fn mark_paid(
        &self,
        id: OrderId,
        confirmation: PaymentResult,
    ) -> Result<Order, AppError> {
        let mut order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

        order.record_payment(confirmation, Utc::now());
        let order = self.orders.update(order).await?;
        tracing::info!(order_id = %order.id, "order marked paid");
        Ok(order)
    }

    /// Mark an order delivered. There is no precondition on payment state.
    /// Admin-only at the boundary.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no such order.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<Order, AppError> {
        let mut order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

        order.record_delivery(Utc::now());
        let order = self.orders.update(order).await?;
        tracing::info!(order_id = %order.id, "order marked delivered");
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storefront_core::{Email, ProductId};

    use crate::store::MemoryStore;

    use super::*;

    fn user(name: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::generate(),
            name: name.to_owned(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(store: &MemoryStore) -> OrderService {
        OrderService::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    fn line_item(price: Decimal, qty: u32) -> OrderItem {
        OrderItem {
            product: ProductId::generate(),
            name: "Widget".to_owned(),
            image: "/images/widget.jpg".to_owned(),
            price,
            qty,
        }
    }

    fn draft(items: Vec<OrderItem>) -> OrderDraft {
        OrderDraft {
            order_items: items,
            shipping_address: Some(ShippingAddress {
                address: "1 Main St".to_owned(),
                city: "Springfield".to_owned(),
                postal_code: "12345".to_owned(),
                country: "US".to_owned(),
            }),
            payment_method: "PayPal".to_owned(),
            items_price: Decimal::new(1998, 2),
            shipping_price: Decimal::new(500, 2),
            tax_price: Decimal::new(200, 2),
            total_price: Decimal::new(2698, 2),
            payment_result: Some(PaymentResult {
                id: "TX-1".to_owned(),
                status: "COMPLETED".to_owned(),
                update_time: "2024-01-01T00:00:00Z".to_owned(),
                payer_email: "payer@example.com".to_owned(),
            }),
        }
    }

    #[tokio::test]
    async fn test_create_order_rejects_empty_cart_without_persisting() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let buyer = user("Buyer", "buyer@example.com");

        let err = orders.create_order(&buyer, draft(Vec::new())).await.unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "No order items"),
            other => panic!("expected validation error, got {other:?}"),
        }

        // Nothing persisted, not even a partial order.
        assert!(orders.list_all_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_rejects_zero_quantity() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let buyer = user("Buyer", "buyer@example.com");

        let err = orders
            .create_order(&buyer, draft(vec![line_item(Decimal::ONE, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(orders.list_all_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_is_recorded_paid_at_creation() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let buyer = user("Buyer", "buyer@example.com");

        let order = orders
            .create_order(&buyer, draft(vec![line_item(Decimal::new(999, 2), 2)]))
            .await
            .unwrap();

        assert!(order.is_paid);
        assert_eq!(order.paid_at, Some(order.created_at));
        assert_eq!(order.payment_result.as_ref().unwrap().id, "TX-1");
        assert_eq!(order.user, buyer.id);
        assert!(!order.is_delivered);
    }

    #[tokio::test]
    async fn test_create_order_totals_add_up_on_happy_path() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let buyer = user("Buyer", "buyer@example.com");

        let order = orders
            .create_order(&buyer, draft(vec![line_item(Decimal::new(999, 2), 2)]))
            .await
            .unwrap();

        assert_eq!(
            order.total_price,
            order.items_price + order.shipping_price + order.tax_price
        );
    }

    #[tokio::test]
    async fn test_create_order_trusts_mismatched_totals() {
        // The server deliberately does not recompute or cross-check the
        // client-supplied price fields; a draft whose totals do not add up is
        // stored verbatim.
        let store = MemoryStore::new();
        let orders = service(&store);
        let buyer = user("Buyer", "buyer@example.com");

        let mut bad = draft(vec![line_item(Decimal::new(999, 2), 2)]);
        bad.total_price = Decimal::new(100, 0);

        let order = orders.create_order(&buyer, bad).await.unwrap();
        assert_eq!(order.total_price, Decimal::new(100, 0));
        assert_ne!(
            order.total_price,
            order.items_price + order.shipping_price + order.tax_price
        );
    }

    #[tokio::test]
    async fn test_strict_pricing_policy_can_reject() {
        struct RequireConsistentTotals;
        impl PricingPolicy for RequireConsistentTotals {
            fn verify(&self, draft: &OrderDraft) -> Result<(), String> {
                let expected = draft.items_price + draft.shipping_price + draft.tax_price;
                if draft.total_price == expected {
                    Ok(())
                } else {
                    Err("Order totals do not add up".to_owned())
                }
            }
        }

        let store = MemoryStore::new();
        let orders = OrderService::with_pricing(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(RequireConsistentTotals),
        );
        let buyer = user("Buyer", "buyer@example.com");

        let mut bad = draft(vec![line_item(Decimal::new(999, 2), 2)]);
        bad.total_price = Decimal::new(100, 0);
        assert!(matches!(
            orders.create_order(&buyer, bad).await,
            Err(AppError::Validation(_))
        ));

        // The same draft with consistent totals passes.
        let ok = draft(vec![line_item(Decimal::new(999, 2), 2)]);
        assert!(orders.create_order(&buyer, ok).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_order_annotates_owner_profile() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let buyer = user("Buyer", "buyer@example.com");
        crate::store::UserStore::insert(&store, buyer.clone()).await.unwrap();

        let created = orders
            .create_order(&buyer, draft(vec![line_item(Decimal::ONE, 1)]))
            .await
            .unwrap();

        let fetched = orders.get_order(created.id).await.unwrap();
        let owner = fetched.owner.unwrap();
        assert_eq!(owner.name, "Buyer");
        assert_eq!(owner.email.as_str(), "buyer@example.com");
        assert_eq!(fetched.order.id, created.id);
    }

    #[tokio::test]
    async fn test_get_order_missing() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let err = orders.get_order(OrderId::generate()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_orders_for_returns_only_own_orders() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let alice = user("Alice", "alice@example.com");
        let bob = user("Bob", "bob@example.com");

        for buyer in [&alice, &bob, &alice] {
            orders
                .create_order(buyer, draft(vec![line_item(Decimal::ONE, 1)]))
                .await
                .unwrap();
        }

        assert_eq!(orders.list_orders_for(alice.id).await.unwrap().len(), 2);
        assert_eq!(orders.list_orders_for(bob.id).await.unwrap().len(), 1);
        assert_eq!(orders.list_all_orders().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_mark_paid_overwrites_previous_confirmation() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let buyer = user("Buyer", "buyer@example.com");

        let created = orders
            .create_order(&buyer, draft(vec![line_item(Decimal::ONE, 1)]))
            .await
            .unwrap();
        let first_paid_at = created.paid_at.unwrap();

        let replacement = PaymentResult {
            id: "TX-2".to_owned(),
            status: "COMPLETED".to_owned(),
            update_time: "2024-02-02T00:00:00Z".to_owned(),
            payer_email: "payer@example.com".to_owned(),
        };
        let updated = orders.mark_paid(created.id, replacement).await.unwrap();

        assert!(updated.is_paid);
        assert_eq!(updated.payment_result.unwrap().id, "TX-2");
        assert!(updated.paid_at.unwrap() >= first_paid_at);
    }

    #[tokio::test]
    async fn test_mark_paid_missing_order() {
        let store = MemoryStore::new();
        let orders = service(&store);

        let confirmation = PaymentResult {
            id: "TX-9".to_owned(),
            status: "COMPLETED".to_owned(),
            update_time: "2024-02-02T00:00:00Z".to_owned(),
            payer_email: "payer@example.com".to_owned(),
        };
        let err = orders
            .mark_paid(OrderId::generate(), confirmation)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_delivered_ignores_payment_state() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let buyer = user("Buyer", "buyer@example.com");

        // Force an unpaid order into the store directly to document that the
        // transition has no payment precondition.
        let mut unpaid = orders
            .create_order(&buyer, draft(vec![line_item(Decimal::ONE, 1)]))
            .await
            .unwrap();
        unpaid.is_paid = false;
        unpaid.paid_at = None;
        unpaid.payment_result = None;
        crate::store::OrderStore::update(&store, unpaid.clone()).await.unwrap();

        let delivered = orders.mark_delivered(unpaid.id).await.unwrap();
        assert!(delivered.is_delivered);
        assert!(delivered.delivered_at.is_some());
        assert!(!delivered.is_paid);
    }

    #[tokio::test]
    async fn test_mark_delivered_missing_order() {
        let store = MemoryStore::new();
        let orders = service(&store);
        let err = orders.mark_delivered(OrderId::generate()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
