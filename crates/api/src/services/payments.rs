//! Payment provider client.
//!
//! The storefront never talks to the payment provider about money it has
//! already recorded: orders trust the confirmation the client relays. The
//! provider is only contacted to set up a checkout redirect - a tax rate and
//! a checkout session - as one synchronous request/response exchange per
//! call, with no retry policy. A provider failure propagates upward
//! unhandled (fail-fast, no compensation logic).
//!
//! PayPal needs no server-side client at all; the frontend only requires the
//! configured client id, served by `GET /config/paypal`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use storefront_core::Email;

/// Stripe REST API base URL.
const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Flat tax percentage applied to checkout sessions.
const TAX_PERCENTAGE: &str = "10";

/// Errors that can occur when talking to the payment provider.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the request.
    #[error("provider returned {status}: {body}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error body, verbatim.
        body: String,
    },

    /// Provider response did not have the expected shape.
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

/// A cart line forwarded to the provider to build a checkout session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Checkout session request.
#[derive(Debug, Clone)]
pub struct CheckoutDraft {
    pub items: Vec<CheckoutItem>,
    pub customer_email: Email,
}

/// A provider-hosted checkout the client should be redirected to.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckoutSession {
    pub url: String,
}

/// Payment provider interface: create a hosted checkout session.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session and return its redirect URL.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the provider call fails; the error is not
    /// retried.
    async fn create_checkout_session(
        &self,
        draft: CheckoutDraft,
    ) -> Result<CheckoutSession, GatewayError>;
}

/// Stripe client.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: SecretString,
    api_base: String,
    /// Public site URL the checkout redirects back to.
    return_base_url: String,
}

#[derive(Debug, Deserialize)]
struct TaxRateResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    url: Option<String>,
}

impl StripeClient {
    /// Create a new Stripe client.
    #[must_use]
    pub fn new(secret_key: SecretString, return_base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            api_base: STRIPE_API_BASE.to_owned(),
            return_base_url,
        }
    }

    /// Override the API base URL (used by tests against a stub server).
    #[must_use]
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    /// Create a flat tax rate for the session.
    async fn create_tax_rate(&self) -> Result<TaxRateResponse, GatewayError> {
        let params = [
            ("display_name", "Tax"),
            ("inclusive", "false"),
            ("percentage", TAX_PERCENTAGE),
            ("country", "US"),
        ];

        let response = self
            .http
            .post(format!("{}/tax_rates", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        draft: CheckoutDraft,
    ) -> Result<CheckoutSession, GatewayError> {
        let tax_rate = self.create_tax_rate().await?;
        let params = build_session_params(&draft, &tax_rate.id, &self.return_base_url);

        let response = self
            .http
            .post(format!("{}/checkout/sessions", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let session: SessionResponse = response.json().await?;
        let url = session
            .url
            .ok_or_else(|| GatewayError::InvalidResponse("session has no url".to_owned()))?;

        tracing::info!("checkout session created");
        Ok(CheckoutSession { url })
    }
}

/// Convert a decimal price to the provider's smallest-unit integer amount.
fn to_unit_amount(price: Decimal) -> i64 {
    (price * Decimal::ONE_HUNDRED).round().to_i64().unwrap_or(0)
}

/// Build the form parameters for a checkout session request.
fn build_session_params(
    draft: &CheckoutDraft,
    tax_rate_id: &str,
    return_base_url: &str,
) -> Vec<(String, String)> {
    let mut params = Vec::new();

    for (i, item) in draft.items.iter().enumerate() {
        params.push((
            format!("line_items[{i}][price_data][currency]"),
            "usd".to_owned(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        params.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            to_unit_amount(item.price).to_string(),
        ));
        params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        params.push((
            format!("line_items[{i}][tax_rates][0]"),
            tax_rate_id.to_owned(),
        ));
    }

    params.push((
        "customer_email".to_owned(),
        draft.customer_email.as_str().to_owned(),
    ));
    params.push(("payment_method_types[0]".to_owned(), "card".to_owned()));
    params.push(("mode".to_owned(), "payment".to_owned()));
    params.push((
        "success_url".to_owned(),
        format!("{return_base_url}/placeorder?success=true&id={{CHECKOUT_SESSION_ID}}"),
    ));
    params.push((
        "cancel_url".to_owned(),
        format!("{return_base_url}/placeorder?canceled=true"),
    ));

    params
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> CheckoutDraft {
        CheckoutDraft {
            items: vec![
                CheckoutItem {
                    name: "Widget".to_owned(),
                    price: Decimal::new(999, 2), // $9.99
                    quantity: 2,
                },
                CheckoutItem {
                    name: "Gadget".to_owned(),
                    price: Decimal::new(2500, 2), // $25.00
                    quantity: 1,
                },
            ],
            customer_email: Email::parse("buyer@example.com").unwrap(),
        }
    }

    #[test]
    fn test_to_unit_amount_converts_to_cents() {
        assert_eq!(to_unit_amount(Decimal::new(999, 2)), 999);
        assert_eq!(to_unit_amount(Decimal::new(2500, 2)), 2500);
        assert_eq!(to_unit_amount(Decimal::ZERO), 0);
    }

    #[test]
    fn test_build_session_params_shape() {
        let params = build_session_params(&draft(), "txr_123", "http://localhost:3000");
        let find = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(
            find("line_items[0][price_data][product_data][name]"),
            Some("Widget")
        );
        assert_eq!(find("line_items[0][price_data][unit_amount]"), Some("999"));
        assert_eq!(find("line_items[0][quantity]"), Some("2"));
        assert_eq!(find("line_items[0][tax_rates][0]"), Some("txr_123"));
        assert_eq!(find("line_items[1][price_data][unit_amount]"), Some("2500"));
        assert_eq!(find("customer_email"), Some("buyer@example.com"));
        assert_eq!(find("mode"), Some("payment"));
        assert_eq!(
            find("success_url"),
            Some("http://localhost:3000/placeorder?success=true&id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(
            find("cancel_url"),
            Some("http://localhost:3000/placeorder?canceled=true")
        );
    }
}
