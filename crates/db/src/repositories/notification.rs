//! Notification repository.

use std::sync::Arc;

use crate::entities::{
    Notification,
    notification::{self, Column},
};
use admarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Repository for notification operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new notification.
    pub async fn create(&self, model: notification::ActiveModel) -> AppResult<notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find notifications for a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<notification::Model>> {
        Notification::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's unread notifications.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark specific notifications as read. Only the owner's rows are
    /// touched.
    pub async fn mark_as_read(&self, user_id: &str, ids: &[String]) -> AppResult<u64> {
        use sea_orm::sea_query::Expr;

        if ids.is_empty() {
            return Ok(0);
        }

        let result = Notification::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Id.is_in(ids.iter().map(String::as_str)))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Mark all of a user's notifications as read.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        use sea_orm::sea_query::Expr;

        let result = Notification::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
