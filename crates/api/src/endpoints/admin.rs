//! Admin endpoints: suspension controls and admin user management.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use admarket_common::AppResult;
use admarket_core::{
    AdminUserResponse, AppealResponse, CreateAdminInput, Identity, RouteAccess, UpdateAdminInput,
};
use admarket_db::entities::user::Role;

use crate::{extractors::AuthIdentity, middleware::AppState, response::ApiResponse};

async fn require_admin(state: &AppState, identity: &Identity) -> AppResult<Option<Response>> {
    state
        .check_access(Some(identity), RouteAccess::Role(Role::Admin))
        .await
}

/// Suspension mutation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendRequest {
    pub user_id: String,
    pub reason: String,
}

/// Unsuspension request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsuspendRequest {
    pub user_id: String,
}

/// Suspension mutation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendResponse {
    pub user_id: String,
    pub is_suspended: bool,
}

/// Suspend an account with a mandatory reason.
async fn suspend(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<SuspendRequest>,
) -> AppResult<Response> {
    if let Some(redirect) = require_admin(&state, &identity).await? {
        return Ok(redirect);
    }

    let user = state
        .moderation_service
        .suspend(&identity.user_id, &req.user_id, &req.reason)
        .await?;

    Ok(ApiResponse::ok(SuspendResponse {
        user_id: user.id,
        is_suspended: user.is_suspended,
    })
    .into_response())
}

/// Lift an account's suspension, clearing flag, reason and date.
async fn unsuspend(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<UnsuspendRequest>,
) -> AppResult<Response> {
    if let Some(redirect) = require_admin(&state, &identity).await? {
        return Ok(redirect);
    }

    let user = state
        .moderation_service
        .unsuspend(&identity.user_id, &req.user_id)
        .await?;

    Ok(ApiResponse::ok(SuspendResponse {
        user_id: user.id,
        is_suspended: user.is_suspended,
    })
    .into_response())
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

/// List admin accounts with their permission grants.
async fn list_users(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    if let Some(redirect) = require_admin(&state, &identity).await? {
        return Ok(redirect);
    }

    let users: Vec<AdminUserResponse> = state
        .admin_service
        .list(query.limit.min(200), query.offset)
        .await?;

    Ok(ApiResponse::ok(users).into_response())
}

/// Create an admin account with structured permission grants.
async fn create_user(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<CreateAdminInput>,
) -> AppResult<Response> {
    if let Some(redirect) = require_admin(&state, &identity).await? {
        return Ok(redirect);
    }

    let created = state.admin_service.create(input).await?;

    tracing::info!(admin_id = %created.id, "Admin account created");

    Ok(ApiResponse::ok(created).into_response())
}

/// Update an admin account. Grants, when present, replace the full set.
async fn update_user(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateAdminInput>,
) -> AppResult<Response> {
    if let Some(redirect) = require_admin(&state, &identity).await? {
        return Ok(redirect);
    }

    let updated = state.admin_service.update(&id, input).await?;

    Ok(ApiResponse::ok(updated).into_response())
}

/// Deletion response.
#[derive(Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Delete an admin account and its grants.
async fn delete_user(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    if let Some(redirect) = require_admin(&state, &identity).await? {
        return Ok(redirect);
    }

    state.admin_service.delete(&identity.user_id, &id).await?;

    Ok(ApiResponse::ok(DeleteResponse { ok: true }).into_response())
}

/// List appeals, newest first.
async fn list_appeals(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    if let Some(redirect) = require_admin(&state, &identity).await? {
        return Ok(redirect);
    }

    let appeals: Vec<AppealResponse> = state
        .appeal_service
        .list(query.limit.min(200), query.offset)
        .await?;

    Ok(ApiResponse::ok(appeals).into_response())
}

/// Create the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/suspend", post(suspend))
        .route("/users/unsuspend", post(unsuspend))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            axum::routing::patch(update_user).delete(delete_user),
        )
        .route("/appeals", get(list_appeals))
}
