//! Moderation service: admin-gated suspension state mutation.

use admarket_common::{AppError, AppResult};
use admarket_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};
use serde::Serialize;

/// Current suspension state of an account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionState {
    pub is_suspended: bool,
    pub suspension_reason: Option<String>,
    pub suspended_at: Option<String>,
}

impl From<&user::Model> for SuspensionState {
    fn from(u: &user::Model) -> Self {
        Self {
            is_suspended: u.is_suspended,
            suspension_reason: u.suspension_reason.clone(),
            suspended_at: u.suspended_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Moderation service.
///
/// The only code path that mutates suspension fields. Tokens are never
/// invalidated here; the role gate picks the new state up on the
/// target's next request.
#[derive(Clone)]
pub struct ModerationService {
    user_repo: UserRepository,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Suspend an account. Reason is mandatory; flag, reason and date
    /// are written in one row update.
    pub async fn suspend(
        &self,
        actor_id: &str,
        target_id: &str,
        reason: &str,
    ) -> AppResult<user::Model> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "Suspension reason is required".to_string(),
            ));
        }

        if actor_id == target_id {
            return Err(AppError::Forbidden(
                "Cannot suspend your own account".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(target_id).await?;

        if target.role == Role::Admin {
            return Err(AppError::Forbidden(
                "Cannot suspend an administrator".to_string(),
            ));
        }

        let updated = self
            .user_repo
            .set_suspension(target, true, Some(reason.to_string()))
            .await?;

        tracing::info!(
            actor_id = actor_id,
            target_id = target_id,
            "Account suspended"
        );

        Ok(updated)
    }

    /// Lift a suspension, clearing flag, reason and date together.
    pub async fn unsuspend(&self, actor_id: &str, target_id: &str) -> AppResult<user::Model> {
        let target = self.user_repo.get_by_id(target_id).await?;

        let updated = self.user_repo.set_suspension(target, false, None).await?;

        tracing::info!(
            actor_id = actor_id,
            target_id = target_id,
            "Account unsuspended"
        );

        Ok(updated)
    }

    /// Read the current suspension state of an account.
    pub async fn suspension_state(&self, user_id: &str) -> AppResult<SuspensionState> {
        let user = self.user_repo.get_by_id(user_id).await?;
        Ok(SuspensionState::from(&user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            email_lower: format!("{id}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
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

    fn service_with(results: Vec<Vec<user::Model>>) -> ModerationService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(results)
                .into_connection(),
        );
        ModerationService::new(UserRepository::new(db))
    }

    #[tokio::test]
    async fn test_suspend_requires_reason() {
        let service = service_with(vec![]);

        let result = service.suspend("admin1", "user1", "   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_suspend_self_rejected() {
        let service = service_with(vec![]);

        let result = service.suspend("admin1", "admin1", "reason").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_suspend_admin_target_rejected() {
        let service = service_with(vec![vec![test_user("admin2", Role::Admin)]]);

        let result = service.suspend("admin1", "admin2", "reason").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_suspend_sets_all_fields() {
        let target = test_user("user1", Role::Advertiser);
        let mut suspended = target.clone();
        suspended.is_suspended = true;
        suspended.suspension_reason = Some("Policy violation".to_string());
        suspended.suspended_at = Some(chrono::Utc::now().into());

        let service = service_with(vec![vec![target], vec![suspended]]);

        let updated = service
            .suspend("admin1", "user1", "Policy violation")
            .await
            .unwrap();

        assert!(updated.is_suspended);
        assert_eq!(
            updated.suspension_reason.as_deref(),
            Some("Policy violation")
        );
        assert!(updated.suspended_at.is_some());
    }

    #[tokio::test]
    async fn test_suspension_state_unknown_user() {
        let service = service_with(vec![vec![]]);

        let result = service.suspension_state("ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
