//! Inbound webhook endpoints.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Router,
};
use serde::Serialize;

use admarket_common::{AppError, AppResult};

use crate::{middleware::AppState, response::ApiResponse};

/// Webhook acknowledgement.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub received: bool,
}

/// Handle a Stripe event.
///
/// The signature is verified over the raw body before any JSON parsing.
/// Unknown event types and unknown bookings acknowledge with 200 so
/// Stripe does not retry them.
async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<ApiResponse<WebhookResponse>> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    state
        .payment_service
        .verify_signature(signature, &body, chrono::Utc::now().timestamp())?;

    let payload: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    state.payment_service.handle_event(&payload).await?;

    Ok(ApiResponse::ok(WebhookResponse { received: true }))
}

/// Create the webhooks router.
pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe))
}
