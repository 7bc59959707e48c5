//! Conversations between advertisers and publishers.

use admarket_common::{AppError, AppResult, IdGenerator};
use admarket_db::{
    entities::{
        conversation, message,
        notification::{self, NotificationType},
        user::Role,
    },
    repositories::{MessagingRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::session::Identity;

/// Input for starting a conversation.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationInput {
    /// The counterpart user (publisher for an advertiser sender, and
    /// vice versa).
    pub recipient_id: String,

    /// Optional booking this conversation is about.
    pub booking_id: Option<String>,

    #[validate(length(min = 1, max = 4000))]
    pub body: String,
}

/// Input for sending a message into an existing conversation.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    #[validate(length(min = 1, max = 4000))]
    pub body: String,
}

/// A conversation as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: String,
    pub advertiser_id: String,
    pub publisher_id: String,
    pub booking_id: Option<String>,
    pub unread_count: u64,
    pub last_message: Option<MessageResponse>,
    pub created_at: String,
}

/// A message as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<message::Model> for MessageResponse {
    fn from(m: message::Model) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            body: m.body,
            is_read: m.is_read,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Messaging service.
#[derive(Clone)]
pub struct MessagingService {
    messaging_repo: MessagingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl MessagingService {
    /// Create a new messaging service.
    #[must_use]
    pub const fn new(messaging_repo: MessagingRepository, user_repo: UserRepository) -> Self {
        Self {
            messaging_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Start a conversation with a counterpart.
    ///
    /// Conversation, opening message and recipient notification are
    /// written in one transaction. If a conversation with the same
    /// counterpart already exists the message is appended to it instead.
    pub async fn start(
        &self,
        sender: &Identity,
        input: StartConversationInput,
    ) -> AppResult<(conversation::Model, message::Model)> {
        input.validate()?;

        let recipient = self.user_repo.get_by_id(&input.recipient_id).await?;

        let (advertiser_id, publisher_id) = match (sender.role, recipient.role) {
            (Role::Advertiser, Role::Publisher) => {
                (sender.user_id.clone(), recipient.id.clone())
            }
            (Role::Publisher, Role::Advertiser) => {
                (recipient.id.clone(), sender.user_id.clone())
            }
            _ => {
                return Err(AppError::BadRequest(
                    "Conversations connect one advertiser and one publisher".to_string(),
                ));
            }
        };

        if let Some(existing) = self
            .messaging_repo
            .find_conversation_between(&advertiser_id, &publisher_id)
            .await?
        {
            let message = self
                .append(sender, &existing, input.body)
                .await?;
            return Ok((existing, message));
        }

        let conversation_id = self.id_gen.generate();

        let conversation = conversation::ActiveModel {
            id: Set(conversation_id.clone()),
            advertiser_id: Set(advertiser_id),
            publisher_id: Set(publisher_id),
            booking_id: Set(input.booking_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        let message = message::ActiveModel {
            id: Set(self.id_gen.generate()),
            conversation_id: Set(conversation_id.clone()),
            sender_id: Set(sender.user_id.clone()),
            body: Set(input.body),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let notification = self.message_notification(&recipient.id, &conversation_id, sender);

        let (conversation, message) = self
            .messaging_repo
            .create_with_message(conversation, message, notification)
            .await?;

        tracing::info!(conversation_id = %conversation.id, "Conversation started");

        Ok((conversation, message))
    }

    /// Send a message into an existing conversation. The sender must be
    /// a participant; the other party is notified transactionally.
    pub async fn send(
        &self,
        sender: &Identity,
        conversation_id: &str,
        input: SendMessageInput,
    ) -> AppResult<message::Model> {
        input.validate()?;

        let conversation = self
            .messaging_repo
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

        self.require_participant(&conversation, &sender.user_id)?;

        self.append(sender, &conversation, input.body).await
    }

    /// List the caller's conversations with unread counts and the latest
    /// message.
    pub async fn conversations(&self, user_id: &str) -> AppResult<Vec<ConversationResponse>> {
        let conversations = self
            .messaging_repo
            .find_conversations_for_user(user_id, 100)
            .await?;

        let mut result = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let unread = self
                .messaging_repo
                .count_unread(&conversation.id, user_id)
                .await?;
            let last = self
                .messaging_repo
                .find_latest_message(&conversation.id)
                .await?;

            result.push(ConversationResponse {
                id: conversation.id,
                advertiser_id: conversation.advertiser_id,
                publisher_id: conversation.publisher_id,
                booking_id: conversation.booking_id,
                unread_count: unread,
                last_message: last.map(MessageResponse::from),
                created_at: conversation.created_at.to_rfc3339(),
            });
        }

        Ok(result)
    }

    /// Fetch a conversation's messages, newest first, marking the other
    /// party's messages as read.
    pub async fn messages(
        &self,
        reader_id: &str,
        conversation_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<MessageResponse>> {
        let conversation = self
            .messaging_repo
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

        self.require_participant(&conversation, reader_id)?;

        self.messaging_repo
            .mark_as_read(conversation_id, reader_id)
            .await?;

        let messages = self
            .messaging_repo
            .find_messages(conversation_id, limit, until_id)
            .await?;

        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    async fn append(
        &self,
        sender: &Identity,
        conversation: &conversation::Model,
        body: String,
    ) -> AppResult<message::Model> {
        let recipient_id = if conversation.advertiser_id == sender.user_id {
            conversation.publisher_id.clone()
        } else {
            conversation.advertiser_id.clone()
        };

        let message = message::ActiveModel {
            id: Set(self.id_gen.generate()),
            conversation_id: Set(conversation.id.clone()),
            sender_id: Set(sender.user_id.clone()),
            body: Set(body),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let notification = self.message_notification(&recipient_id, &conversation.id, sender);

        self.messaging_repo
            .append_message(message, notification)
            .await
    }

    fn message_notification(
        &self,
        recipient_id: &str,
        conversation_id: &str,
        sender: &Identity,
    ) -> notification::ActiveModel {
        notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(recipient_id.to_string()),
            notification_type: Set(NotificationType::Message),
            body: Set(format!(
                "New message from {} {}",
                sender.first_name, sender.last_name
            )),
            reference_id: Set(Some(conversation_id.to_string())),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        }
    }

    fn require_participant(
        &self,
        conversation: &conversation::Model,
        user_id: &str,
    ) -> AppResult<()> {
        if conversation.advertiser_id != user_id && conversation.publisher_id != user_id {
            return Err(AppError::Forbidden(
                "Not a participant in this conversation".to_string(),
            ));
        }
        Ok(())
    }
}
