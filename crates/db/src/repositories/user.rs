//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use admarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::EmailLower.eq(email.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        User::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Set the suspension triple on a user in one row update.
    ///
    /// Reason and date are set together with the flag so the record can
    /// never be observed suspended without a reason.
    pub async fn set_suspension(
        &self,
        user: user::Model,
        suspended: bool,
        reason: Option<String>,
    ) -> AppResult<user::Model> {
        let mut active: user::ActiveModel = user.into();
        if suspended {
            active.is_suspended = Set(true);
            active.suspension_reason = Set(reason);
            active.suspended_at = Set(Some(chrono::Utc::now().into()));
        } else {
            active.is_suspended = Set(false);
            active.suspension_reason = Set(None);
            active.suspended_at = Set(None);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.update(active).await
    }

    /// List users with a given role (paginated, newest first).
    pub async fn find_by_role(
        &self,
        role: user::Role,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Role.eq(role))
            .order_by_desc(user::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users with a given role.
    pub async fn count_by_role(&self, role: user::Role) -> AppResult<u64> {
        User::find()
            .filter(user::Column::Role.eq(role))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, email: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: email.to_string(),
            email_lower: email.to_lowercase(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role: user::Role::Advertiser,
            password_hash: "$argon2id$test".to_string(),
            is_email_verified: true,
            is_activated: true,
            is_suspended: false,
            suspension_reason: None,
            suspended_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user("user1", "a@example.com");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id("user1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().email, "a@example.com");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive_lookup() {
        let user = create_test_user("user1", "a@example.com");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_email("A@Example.COM").await.unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_set_suspension_clears_fields_on_unsuspend() {
        let mut suspended = create_test_user("user1", "a@example.com");
        suspended.is_suspended = true;
        suspended.suspension_reason = Some("policy violation".to_string());
        suspended.suspended_at = Some(Utc::now().into());

        let mut lifted = suspended.clone();
        lifted.is_suspended = false;
        lifted.suspension_reason = None;
        lifted.suspended_at = None;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[lifted]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.set_suspension(suspended, false, None).await.unwrap();

        assert!(!result.is_suspended);
        assert!(result.suspension_reason.is_none());
        assert!(result.suspended_at.is_none());
    }
}
