//! Appeal repository.

use std::sync::Arc;

use crate::entities::{Appeal, appeal};
use admarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Appeal repository for database operations.
#[derive(Clone)]
pub struct AppealRepository {
    db: Arc<DatabaseConnection>,
}

impl AppealRepository {
    /// Create a new appeal repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Persist a new appeal. Append-only: no uniqueness constraint, a user
    /// may submit any number of appeals.
    pub async fn create(&self, model: appeal::ActiveModel) -> AppResult<appeal::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List appeals for a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<appeal::Model>> {
        Appeal::find()
            .filter(appeal::Column::UserId.eq(user_id))
            .order_by_desc(appeal::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all appeals, newest first (paginated).
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<appeal::Model>> {
        Appeal::find()
            .order_by_desc(appeal::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all appeals.
    pub async fn count(&self) -> AppResult<u64> {
        Appeal::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::user::Role;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use std::sync::Arc;

    fn create_test_appeal(id: &str, user_id: &str) -> appeal::Model {
        appeal::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            user_role: Role::Publisher,
            suspension_reason: "policy violation".to_string(),
            message: "Please review my account".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_appeal() {
        let appeal = create_test_appeal("appeal1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[appeal.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = AppealRepository::new(db);
        let active = appeal::ActiveModel {
            id: Set("appeal1".to_string()),
            user_id: Set("user1".to_string()),
            user_role: Set(Role::Publisher),
            suspension_reason: Set("policy violation".to_string()),
            message: Set("Please review my account".to_string()),
            created_at: Set(Utc::now().into()),
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.user_id, "user1");
    }

    #[tokio::test]
    async fn test_find_by_user_returns_multiple() {
        let first = create_test_appeal("appeal1", "user1");
        let second = create_test_appeal("appeal2", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[second, first]])
                .into_connection(),
        );

        let repo = AppealRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        // Append-only log: repeated appeals from the same user coexist
        assert_eq!(result.len(), 2);
    }
}
