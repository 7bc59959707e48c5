//! API endpoints.

mod account;
mod admin;
mod appeals;
mod auth;
mod bookings;
mod dashboard;
mod messaging;
mod notifications;
mod webhooks;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .nest("/account", account::router())
        .nest("/appeals", appeals::router())
        .nest("/admin", admin::router())
        .nest("/bookings", bookings::router())
        .nest("/messaging", messaging::router())
        .nest("/notifications", notifications::router())
        .nest("/webhooks", webhooks::router())
}
