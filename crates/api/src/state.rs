//! Application state shared across handlers.

use std::sync::Arc;

use chrono::Duration;

use crate::config::ApiConfig;
use crate::services::auth::{AuthError, AuthService};
use crate::services::catalog::CatalogService;
use crate::services::orders::OrderService;
use crate::services::payments::{PaymentGateway, StripeClient};
use crate::store::{MemoryStore, OrderStore, ProductStore, UserStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Services are constructed once
/// here, each receiving its store handles explicitly - there is no ambient
/// global store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    auth: AuthService,
    catalog: CatalogService,
    orders: OrderService,
    gateway: Option<Arc<dyn PaymentGateway>>,
}

impl AppState {
    /// Create a new application state backed by the given store.
    #[must_use]
    pub fn new(config: ApiConfig, store: MemoryStore) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(store.clone());
        let products: Arc<dyn ProductStore> = Arc::new(store.clone());
        let orders: Arc<dyn OrderStore> = Arc::new(store);

        let auth = AuthService::new(
            Arc::clone(&users),
            &config.jwt_secret,
            Duration::hours(config.jwt_lifetime_hours),
        );
        let catalog = CatalogService::new(products);
        let orders = OrderService::new(orders, users);

        let gateway: Option<Arc<dyn PaymentGateway>> = config
            .stripe_secret_key
            .clone()
            .map(|key| {
                Arc::new(StripeClient::new(key, config.base_url.clone()))
                    as Arc<dyn PaymentGateway>
            });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                auth,
                catalog,
                orders,
                gateway,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Get the payment gateway, if one is configured.
    #[must_use]
    pub fn gateway(&self) -> Option<&Arc<dyn PaymentGateway>> {
        self.inner.gateway.as_ref()
    }

    /// Create the bootstrap admin account when configured.
    ///
    /// Registration races and restarts are tolerated: an already-registered
    /// email is logged and skipped.
    pub async fn bootstrap_admin(&self) {
        let Some(admin) = self.inner.config.bootstrap_admin.clone() else {
            return;
        };

        use secrecy::ExposeSecret;
        match self
            .inner
            .auth
            .register(&admin.name, &admin.email, admin.password.expose_secret())
            .await
        {
            Ok((user, _)) => {
                if let Err(e) = self.inner.auth.set_admin(user.id, true).await {
                    tracing::error!(error = %e, "failed to promote bootstrap admin");
                } else {
                    tracing::info!(user_id = %user.id, "bootstrap admin created");
                }
            }
            Err(AuthError::UserAlreadyExists) => {
                tracing::info!("bootstrap admin already registered");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create bootstrap admin");
            }
        }
    }
}
