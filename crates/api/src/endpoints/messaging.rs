//! Messaging endpoints.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use admarket_common::AppResult;
use admarket_core::{
    ConversationResponse, MessageResponse, RouteAccess, SendMessageInput, StartConversationInput,
};

use crate::{extractors::AuthIdentity, middleware::AppState, response::ApiResponse};

/// Conversation with its opening (or appended) message.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub conversation_id: String,
    pub message: MessageResponse,
}

/// Start a conversation with a counterpart, or append to the existing
/// one between the same pair.
async fn start(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Json(input): Json<StartConversationInput>,
) -> AppResult<Response> {
    if let Some(redirect) = state
        .check_access(Some(&identity), RouteAccess::Role(identity.role))
        .await?
    {
        return Ok(redirect);
    }

    let (conversation, message) = state.messaging_service.start(&identity, input).await?;

    Ok(ApiResponse::ok(StartResponse {
        conversation_id: conversation.id,
        message: MessageResponse::from(message),
    })
    .into_response())
}

/// List the caller's conversations with unread counts.
async fn conversations(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
) -> AppResult<Response> {
    if let Some(redirect) = state
        .check_access(Some(&identity), RouteAccess::Role(identity.role))
        .await?
    {
        return Ok(redirect);
    }

    let conversations = state
        .messaging_service
        .conversations(&identity.user_id)
        .await?;

    Ok(ApiResponse::ok(conversations).into_response())
}

/// Send a message into an existing conversation.
async fn send(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(input): Json<SendMessageInput>,
) -> AppResult<Response> {
    if let Some(redirect) = state
        .check_access(Some(&identity), RouteAccess::Role(identity.role))
        .await?
    {
        return Ok(redirect);
    }

    let message = state
        .messaging_service
        .send(&identity, &conversation_id, input)
        .await?;

    Ok(ApiResponse::ok(MessageResponse::from(message)).into_response())
}

/// Message pagination query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    50
}

/// Fetch a conversation's messages, marking the other party's as read.
async fn messages(
    AuthIdentity(identity): AuthIdentity,
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> AppResult<Response> {
    if let Some(redirect) = state
        .check_access(Some(&identity), RouteAccess::Role(identity.role))
        .await?
    {
        return Ok(redirect);
    }

    let messages = state
        .messaging_service
        .messages(
            &identity.user_id,
            &conversation_id,
            query.limit.min(200),
            query.until_id.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok(messages).into_response())
}

/// Create the messaging router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(conversations))
        .route("/start", post(start))
        .route("/{conversationId}", post(send).get(messages))
}
