//! Conversation and message repository.

use std::sync::Arc;

use crate::entities::{
    Conversation, Message, conversation,
    message::{self, Column},
    notification,
};
use admarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

/// Repository for conversation and message operations.
#[derive(Clone)]
pub struct MessagingRepository {
    db: Arc<DatabaseConnection>,
}

impl MessagingRepository {
    /// Create a new messaging repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a conversation by ID.
    pub async fn find_conversation(&self, id: &str) -> AppResult<Option<conversation::Model>> {
        Conversation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the conversation between two users, if one exists.
    pub async fn find_conversation_between(
        &self,
        advertiser_id: &str,
        publisher_id: &str,
    ) -> AppResult<Option<conversation::Model>> {
        Conversation::find()
            .filter(conversation::Column::AdvertiserId.eq(advertiser_id))
            .filter(conversation::Column::PublisherId.eq(publisher_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List conversations the user participates in, newest first.
    pub async fn find_conversations_for_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<conversation::Model>> {
        Conversation::find()
            .filter(
                Condition::any()
                    .add(conversation::Column::AdvertiserId.eq(user_id))
                    .add(conversation::Column::PublisherId.eq(user_id)),
            )
            .order_by_desc(conversation::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a conversation, its opening message and the recipient's
    /// notification in one transaction.
    pub async fn create_with_message(
        &self,
        conversation: conversation::ActiveModel,
        message: message::ActiveModel,
        notification: notification::ActiveModel,
    ) -> AppResult<(conversation::Model, message::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let conversation = conversation
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let message = message
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        notification
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((conversation, message))
    }

    /// Append a message to an existing conversation and notify the
    /// recipient in one transaction.
    pub async fn append_message(
        &self,
        message: message::ActiveModel,
        notification: notification::ActiveModel,
    ) -> AppResult<message::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let message = message
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        notification
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(message)
    }

    /// Find messages in a conversation, newest first.
    pub async fn find_messages(
        &self,
        conversation_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<message::Model>> {
        let mut query = Message::find()
            .filter(Column::ConversationId.eq(conversation_id))
            .order_by_desc(Column::CreatedAt);

        if let Some(until) = until_id
            && let Some(until_msg) = self.find_message(until).await?
        {
            query = query.filter(Column::CreatedAt.lt(until_msg.created_at));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a message by ID.
    pub async fn find_message(&self, id: &str) -> AppResult<Option<message::Model>> {
        Message::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the latest message in a conversation.
    pub async fn find_latest_message(
        &self,
        conversation_id: &str,
    ) -> AppResult<Option<message::Model>> {
        Message::find()
            .filter(Column::ConversationId.eq(conversation_id))
            .order_by_desc(Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a reader's unread messages in a conversation.
    pub async fn count_unread(&self, conversation_id: &str, reader_id: &str) -> AppResult<u64> {
        Message::find()
            .filter(Column::ConversationId.eq(conversation_id))
            .filter(Column::SenderId.ne(reader_id))
            .filter(Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark the other party's messages in a conversation as read.
    pub async fn mark_as_read(&self, conversation_id: &str, reader_id: &str) -> AppResult<u64> {
        use sea_orm::sea_query::Expr;

        let result = Message::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::ConversationId.eq(conversation_id))
            .filter(Column::SenderId.ne(reader_id))
            .filter(Column::IsRead.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_conversation(id: &str) -> conversation::Model {
        conversation::Model {
            id: id.to_string(),
            advertiser_id: "adv1".to_string(),
            publisher_id: "pub1".to_string(),
            booking_id: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_message(id: &str, conversation_id: &str) -> message::Model {
        message::Model {
            id: id.to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: "adv1".to_string(),
            body: "Hello".to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_conversation_between() {
        let conversation = create_test_conversation("conv1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[conversation.clone()]])
                .into_connection(),
        );

        let repo = MessagingRepository::new(db);
        let result = repo
            .find_conversation_between("adv1", "pub1")
            .await
            .unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "conv1");
    }

    #[tokio::test]
    async fn test_find_messages() {
        let first = create_test_message("msg1", "conv1");
        let second = create_test_message("msg2", "conv1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[first, second]])
                .into_connection(),
        );

        let repo = MessagingRepository::new(db);
        let result = repo.find_messages("conv1", 50, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
