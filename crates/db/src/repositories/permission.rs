//! Permission grant repository.

use std::sync::Arc;

use crate::entities::{
    PermissionGrant,
    permission_grant::{self, Column},
};
use admarket_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

/// Repository for admin permission grants.
#[derive(Clone)]
pub struct PermissionRepository {
    db: Arc<DatabaseConnection>,
}

impl PermissionRepository {
    /// Create a new permission repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find all grants for a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<permission_grant::Model>> {
        PermissionGrant::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::Module)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace a user's grants with the given set in one transaction.
    pub async fn replace_for_user(
        &self,
        user_id: &str,
        grants: Vec<permission_grant::ActiveModel>,
    ) -> AppResult<Vec<permission_grant::Model>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        PermissionGrant::delete_many()
            .filter(Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut inserted = Vec::with_capacity(grants.len());
        for grant in grants {
            let model = grant
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            inserted.push(model);
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted)
    }

    /// Delete all grants for a user.
    pub async fn delete_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = PermissionGrant::delete_many()
            .filter(Column::UserId.eq(user_id))
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
    use crate::entities::permission_grant::{Module, Permission};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_grant(id: &str, module: Module, permission: Permission) -> permission_grant::Model {
        permission_grant::Model {
            id: id.to_string(),
            user_id: "admin1".to_string(),
            permission,
            module,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let first = create_test_grant("g1", Module::Users, Permission::Manage);
        let second = create_test_grant("g2", Module::Appeals, Permission::Read);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[first, second]])
                .into_connection(),
        );

        let repo = PermissionRepository::new(db);
        let result = repo.find_by_user("admin1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].permission, Permission::Manage);
    }
}
