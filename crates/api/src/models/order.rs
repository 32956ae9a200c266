//! Order domain types.
//!
//! Price fields are snapshots fixed at creation time. They are supplied by
//! the client and deliberately never recomputed from live catalog prices;
//! see `services::orders::PricingPolicy` for the verification seam.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{OrderId, ProductId, UserId};

/// A line item: product reference plus name/image/price snapshots captured
/// at order-creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Referenced product.
    pub product: ProductId,
    /// Product name snapshot.
    pub name: String,
    /// Product image snapshot.
    pub image: String,
    /// Unit price snapshot.
    pub price: Decimal,
    /// Quantity ordered, at least 1.
    pub qty: u32,
}

/// Shipping address. All fields are required together; an order either has a
/// complete address or none at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Payment confirmation issued by the external provider, trusted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    /// External transaction id.
    pub id: String,
    /// Provider-reported status.
    pub status: String,
    /// Provider-reported update timestamp (provider formats vary).
    pub update_time: String,
    /// Payer email reported by the provider.
    pub payer_email: String,
}

/// An order (domain type).
///
/// Created once by its owner, then mutated only through the pay and deliver
/// transitions. `total_price == items_price + shipping_price + tax_price` is
/// a construction-time contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Purchasing principal.
    pub user: UserId,
    /// Ordered line items, never empty.
    pub order_items: Vec<OrderItem>,
    /// Shipping address, complete or absent.
    pub shipping_address: Option<ShippingAddress>,
    /// Payment method label (e.g. "PayPal", "Stripe").
    pub payment_method: String,
    /// Items subtotal snapshot.
    pub items_price: Decimal,
    /// Shipping price snapshot.
    pub shipping_price: Decimal,
    /// Tax price snapshot.
    pub tax_price: Decimal,
    /// Total price snapshot.
    pub total_price: Decimal,
    /// Payment state.
    pub is_paid: bool,
    /// Confirmation recorded when payment was reported.
    pub payment_result: Option<PaymentResult>,
    /// When payment was recorded.
    pub paid_at: Option<DateTime<Utc>>,
    /// Delivery state.
    pub is_delivered: bool,
    /// When delivery was recorded; set only once delivered.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Record payment: flips the paid flag, stamps `paid_at` and stores the
    /// confirmation. Not idempotent: a second call overwrites both.
    pub fn record_payment(&mut self, confirmation: PaymentResult, at: DateTime<Utc>) {
        self.is_paid = true;
        self.paid_at = Some(at);
        self.payment_result = Some(confirmation);
    }

    /// Record delivery. There is no precondition on payment state.
    pub fn record_delivery(&mut self, at: DateTime<Utc>) {
        self.is_delivered = true;
        self.delivered_at = Some(at);
    }
}
