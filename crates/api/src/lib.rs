//! HTTP API layer for admarket.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: Auth, account, appeals, admin, bookings, messaging,
//!   notifications, dashboards, and the Stripe webhook
//! - **Extractors**: Authentication
//! - **Middleware**: Session resolution and route gating
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{auth_middleware, AppState};
