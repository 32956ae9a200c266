//! Integration tests for the storefront API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the API with a strong JWT secret and a bootstrap admin
//! JWT_SECRET=$(openssl rand -hex 32) \
//! STOREFRONT_ADMIN_EMAIL=admin@example.com \
//! STOREFRONT_ADMIN_PASSWORD=admin-pw-123 \
//! cargo run -p storefront-api
//!
//! # Run integration tests (ignored by default)
//! cargo test -p storefront-integration-tests -- --ignored
//! ```
//!
//! The API holds its documents in memory, so each server start begins from a
//! clean slate plus the bootstrap admin.

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// Bootstrap admin email the server was started with.
#[must_use]
pub fn admin_email() -> String {
    std::env::var("STOREFRONT_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string())
}

/// Bootstrap admin password the server was started with.
#[must_use]
pub fn admin_password() -> String {
    std::env::var("STOREFRONT_ADMIN_PASSWORD").unwrap_or_else(|_| "admin-pw-123".to_string())
}

/// A unique throwaway email for registration tests.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4())
}
