//! Notification read surface.

use admarket_common::AppResult;
use admarket_db::{entities::notification, repositories::NotificationRepository};
use serde::{Deserialize, Serialize};

/// Input for marking notifications read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadInput {
    /// Specific notification ids; `None` marks everything read.
    pub ids: Option<Vec<String>>,
}

/// A notification as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: notification::NotificationType,
    pub body: String,
    pub reference_id: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            notification_type: n.notification_type,
            body: n.body,
            reference_id: n.reference_id,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// Notification service.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self { notification_repo }
    }

    /// List the caller's notifications, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<NotificationResponse>> {
        let notifications = self
            .notification_repo
            .find_by_user(user_id, limit, offset)
            .await?;

        Ok(notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect())
    }

    /// Count unread notifications.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark notifications read. Only the caller's rows are affected.
    pub async fn mark_read(&self, user_id: &str, input: MarkReadInput) -> AppResult<u64> {
        match input.ids {
            Some(ids) => self.notification_repo.mark_as_read(user_id, &ids).await,
            None => self.notification_repo.mark_all_as_read(user_id).await,
        }
    }
}
