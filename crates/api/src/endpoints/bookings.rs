//! Booking endpoints.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use admarket_common::AppResult;
use admarket_core::{BookingResponse, CreateBookingInput, RouteAccess};
use admarket_db::entities::user::Role;

use crate::{extractors::AuthIdentity, middleware::AppState, response::ApiResponse};

/// Create a pending booking with a publisher. Advertisers only.
async fn create(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<CreateBookingInput>,
) -> AppResult<Response> {
    if let Some(redirect) = state
        .check_access(Some(&identity), RouteAccess::Role(Role::Advertiser))
        .await?
    {
        return Ok(redirect);
    }

    let booking = state.booking_service.create(&identity, input).await?;

    Ok(ApiResponse::ok(BookingResponse::from(booking)).into_response())
}

/// List pagination query.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

/// List bookings where the caller is a party, newest first.
async fn list(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    if let Some(redirect) = state
        .check_access(Some(&identity), RouteAccess::Role(identity.role))
        .await?
    {
        return Ok(redirect);
    }

    let bookings = state
        .booking_service
        .list_for_user(&identity.user_id, query.limit.min(200), query.offset)
        .await?;

    Ok(ApiResponse::ok(bookings).into_response())
}

/// Create the bookings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create).get(list))
}
