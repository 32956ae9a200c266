//! Domain services.
//!
//! Each service owns one slice of the domain and receives its store handles
//! at construction time:
//!
//! - [`auth`] - registration, login, bearer credentials, user administration
//! - [`catalog`] - product CRUD, pagination, top products, review aggregation
//! - [`orders`] - order lifecycle: create, pay, deliver, list
//! - [`payments`] - external payment provider client (Stripe checkout)

pub mod auth;
pub mod catalog;
pub mod orders;
pub mod payments;
