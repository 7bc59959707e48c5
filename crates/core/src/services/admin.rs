//! Admin back-office user management with structured permission grants.

use admarket_common::{AppError, AppResult, IdGenerator};
use admarket_db::{
    entities::{
        permission_grant::{self, Module, Permission},
        user::{self, Role},
    },
    repositories::{PermissionRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::account::hash_password;

/// One permission grant in API form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrantInput {
    pub permission: Permission,
    pub module: Module,
}

/// Input for creating an admin account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub first_name: String,

    #[validate(length(min = 1, max = 128))]
    pub last_name: String,

    pub permissions: Vec<GrantInput>,
}

/// Input for updating an admin account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminInput {
    #[validate(length(min = 1, max = 128))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub last_name: Option<String>,

    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,

    /// Full replacement set; `None` leaves grants untouched.
    pub permissions: Option<Vec<GrantInput>>,
}

/// Admin account with its grants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub permissions: Vec<GrantInput>,
    pub created_at: String,
}

fn to_response(user: &user::Model, grants: &[permission_grant::Model]) -> AdminUserResponse {
    AdminUserResponse {
        id: user.id.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        permissions: grants
            .iter()
            .map(|g| GrantInput {
                permission: g.permission,
                module: g.module,
            })
            .collect(),
        created_at: user.created_at.to_rfc3339(),
    }
}

/// Admin user management service.
#[derive(Clone)]
pub struct AdminUserService {
    user_repo: UserRepository,
    permission_repo: PermissionRepository,
    id_gen: IdGenerator,
}

impl AdminUserService {
    /// Create a new admin user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, permission_repo: PermissionRepository) -> Self {
        Self {
            user_repo,
            permission_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List admin accounts with their grants.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<AdminUserResponse>> {
        let admins = self.user_repo.find_by_role(Role::Admin, limit, offset).await?;

        let mut result = Vec::with_capacity(admins.len());
        for admin in admins {
            let grants = self.permission_repo.find_by_user(&admin.id).await?;
            result.push(to_response(&admin, &grants));
        }

        Ok(result)
    }

    /// Create an admin account with structured grants.
    pub async fn create(&self, input: CreateAdminInput) -> AppResult<AdminUserResponse> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();

        let model = user::ActiveModel {
            id: Set(user_id.clone()),
            email: Set(input.email.clone()),
            email_lower: Set(input.email.to_lowercase()),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            role: Set(Role::Admin),
            password_hash: Set(password_hash),
            is_email_verified: Set(true),
            is_activated: Set(true),
            is_suspended: Set(false),
            suspension_reason: Set(None),
            suspended_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        let grants = self.replace_grants(&user_id, &input.permissions).await?;

        tracing::info!(user_id = %user.id, "Admin account created");

        Ok(to_response(&user, &grants))
    }

    /// Update an admin account. Grants, when provided, are a full
    /// replacement set.
    pub async fn update(
        &self,
        target_id: &str,
        input: UpdateAdminInput,
    ) -> AppResult<AdminUserResponse> {
        input.validate()?;

        let user = self.user_repo.get_by_id(target_id).await?;
        if user.role != Role::Admin {
            return Err(AppError::BadRequest("Not an admin account".to_string()));
        }

        let mut active: user::ActiveModel = user.into();
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(password) = input.password {
            active.password_hash = Set(hash_password(&password)?);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.user_repo.update(active).await?;

        let grants = match input.permissions {
            Some(permissions) => self.replace_grants(target_id, &permissions).await?,
            None => self.permission_repo.find_by_user(target_id).await?,
        };

        Ok(to_response(&updated, &grants))
    }

    /// Delete an admin account. Only admin accounts can be deleted
    /// through this surface, and never one's own.
    pub async fn delete(&self, actor_id: &str, target_id: &str) -> AppResult<()> {
        if actor_id == target_id {
            return Err(AppError::Forbidden(
                "Cannot delete your own account".to_string(),
            ));
        }

        let user = self.user_repo.get_by_id(target_id).await?;
        if user.role != Role::Admin {
            return Err(AppError::BadRequest("Not an admin account".to_string()));
        }

        self.permission_repo.delete_for_user(target_id).await?;
        self.user_repo.delete(target_id).await?;

        tracing::info!(actor_id = actor_id, target_id = target_id, "Admin account deleted");

        Ok(())
    }

    async fn replace_grants(
        &self,
        user_id: &str,
        permissions: &[GrantInput],
    ) -> AppResult<Vec<permission_grant::Model>> {
        let models = permissions
            .iter()
            .map(|g| permission_grant::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                permission: Set(g.permission),
                module: Set(g.module),
                created_at: Set(chrono::Utc::now().into()),
            })
            .collect();

        self.permission_repo.replace_for_user(user_id, models).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_admin(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            email_lower: format!("{id}@example.com"),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            role: Role::Admin,
            password_hash: String::new(),
            is_email_verified: true,
            is_activated: true,
            is_suspended: false,
            suspension_reason: None,
            suspended_at: None,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> AdminUserService {
        let db = Arc::new(db);
        AdminUserService::new(
            UserRepository::new(db.clone()),
            PermissionRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_delete_self_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);

        let result = service.delete("admin1", "admin1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_non_admin_rejected() {
        let mut target = test_admin("user1");
        target.role = Role::Publisher;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![target]])
            .into_connection();
        let service = service_with(db);

        let result = service.delete("admin1", "user1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_admin("admin2")]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let service = service_with(db);

        service.delete("admin1", "admin2").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_admin("admin2")]])
            .into_connection();
        let service = service_with(db);

        let result = service
            .create(CreateAdminInput {
                email: "admin2@example.com".to_string(),
                password: "longenoughpw".to_string(),
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
                permissions: vec![],
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
