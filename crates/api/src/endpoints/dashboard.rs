//! Role-scoped dashboard endpoints.
//!
//! These are the routes the role gate protects: anonymous callers are
//! redirected to login, suspended accounts to the suspended notice, and
//! callers of the other role to their own dashboard.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;

use admarket_common::AppResult;
use admarket_core::{BookingResponse, Identity, RouteAccess, UserSummary};
use admarket_db::entities::user::Role;

use crate::{extractors::MaybeIdentity, middleware::AppState, response::ApiResponse};

const DASHBOARD_BOOKINGS: u64 = 20;

/// Dashboard summary payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user: UserSummary,
    pub bookings: Vec<BookingResponse>,
    pub unread_notifications: u64,
}

async fn dashboard_for(
    state: &AppState,
    identity: Option<Identity>,
    role: Role,
) -> AppResult<Response> {
    if let Some(redirect) = state
        .check_access(identity.as_ref(), RouteAccess::Role(role))
        .await?
    {
        return Ok(redirect);
    }

    // The gate only allows authenticated callers through.
    let Some(identity) = identity else {
        return Err(admarket_common::AppError::Unauthorized);
    };

    let user = state.account_service.get(&identity.user_id).await?;
    let bookings = state
        .booking_service
        .list_for_user(&identity.user_id, DASHBOARD_BOOKINGS, 0)
        .await?;
    let unread_notifications = state
        .notification_service
        .unread_count(&identity.user_id)
        .await?;

    Ok(ApiResponse::ok(DashboardResponse {
        user: UserSummary::from(&user),
        bookings,
        unread_notifications,
    })
    .into_response())
}

/// Advertiser dashboard.
async fn advertiser_dashboard(
    MaybeIdentity(identity): MaybeIdentity,
    State(state): State<AppState>,
) -> AppResult<Response> {
    dashboard_for(&state, identity, Role::Advertiser).await
}

/// Publisher dashboard.
async fn publisher_dashboard(
    MaybeIdentity(identity): MaybeIdentity,
    State(state): State<AppState>,
) -> AppResult<Response> {
    dashboard_for(&state, identity, Role::Publisher).await
}

/// Create the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/advertiser/dashboard", get(advertiser_dashboard))
        .route("/publisher/dashboard", get(publisher_dashboard))
}
