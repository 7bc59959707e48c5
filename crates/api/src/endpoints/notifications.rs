//! Notification endpoints.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use admarket_common::AppResult;
use admarket_core::{MarkReadInput, NotificationResponse, RouteAccess};

use crate::{extractors::AuthIdentity, middleware::AppState, response::ApiResponse};

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

/// Notification list payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: u64,
}

/// List the caller's notifications, newest first.
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

    let notifications = state
        .notification_service
        .list(&identity.user_id, query.limit.min(200), query.offset)
        .await?;
    let unread_count = state
        .notification_service
        .unread_count(&identity.user_id)
        .await?;

    Ok(ApiResponse::ok(ListResponse {
        notifications,
        unread_count,
    })
    .into_response())
}

/// Mark-read response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub updated: u64,
}

/// Mark notifications as read. Without ids, marks all of them.
async fn mark_read(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<MarkReadInput>,
) -> AppResult<Response> {
    if let Some(redirect) = state
        .check_access(Some(&identity), RouteAccess::Role(identity.role))
        .await?
    {
        return Ok(redirect);
    }

    let updated = state
        .notification_service
        .mark_read(&identity.user_id, input)
        .await?;

    Ok(ApiResponse::ok(MarkReadResponse { updated }).into_response())
}

/// Create the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/read", post(mark_read))
}
