//! Suspension appeal endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use admarket_common::AppResult;
use admarket_core::SubmitAppealInput;

use crate::{extractors::AuthIdentity, middleware::AppState, response::ApiResponse};

/// Appeal submission request. The appellant is always the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealRequest {
    pub message: String,
}

/// Appeal submission response.
#[derive(Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
}

/// Submit an appeal against the caller's current suspension.
///
/// Reachable while suspended. Rejects with `NOT_SUSPENDED` when the
/// caller's account is not currently suspended.
async fn submit(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(req): Json<AppealRequest>,
) -> AppResult<ApiResponse<SubmitResponse>> {
    let appeal = state
        .appeal_service
        .submit(SubmitAppealInput {
            user_id: identity.user_id,
            message: req.message,
        })
        .await?;

    tracing::info!(appeal_id = %appeal.id, user_id = %appeal.user_id, "Appeal submitted");

    Ok(ApiResponse::ok(SubmitResponse { ok: true }))
}

/// Create the appeals router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit))
}
