//! Account endpoints.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use admarket_common::{AppError, AppResult};
use admarket_core::{RouteAccess, SuspensionState, UserSummary};
use admarket_db::entities::user::Role;

use crate::{extractors::AuthIdentity, middleware::AppState, response::ApiResponse};

/// Fetch the caller's account from the current user row.
async fn me(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
) -> AppResult<Response> {
    if let Some(redirect) = state
        .check_access(Some(&identity), RouteAccess::Role(identity.role))
        .await?
    {
        return Ok(redirect);
    }

    let user = state.account_service.get(&identity.user_id).await?;
    Ok(ApiResponse::ok(UserSummary::from(&user)).into_response())
}

/// Suspension check query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionQuery {
    pub user_id: String,
}

/// Fetch the live suspension state for a user.
///
/// This backs the suspended notice page, so it is gated as a notice
/// route: reachable while suspended, and a caller who is no longer
/// suspended is sent back to their dashboard. Admins may query anyone.
async fn suspension(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Query(query): Query<SuspensionQuery>,
) -> AppResult<Response> {
    if identity.role != Role::Admin {
        if identity.user_id != query.user_id {
            return Err(AppError::Forbidden(
                "Cannot view another user's suspension state".to_string(),
            ));
        }

        if let Some(redirect) = state
            .check_access(Some(&identity), RouteAccess::SuspensionNotice(identity.role))
            .await?
        {
            return Ok(redirect);
        }
    }

    let suspension = state
        .moderation_service
        .suspension_state(&query.user_id)
        .await?;

    Ok(ApiResponse::ok(suspension).into_response())
}

/// Create the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/suspension", get(suspension))
}
