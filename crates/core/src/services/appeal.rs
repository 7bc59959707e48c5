//! Appeal workflow for suspended accounts.

use admarket_common::{AppError, AppResult, IdGenerator};
use admarket_db::{
    entities::appeal,
    repositories::{AppealRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for submitting an appeal.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAppealInput {
    pub user_id: String,

    #[validate(length(min = 1, max = 1000))]
    pub message: String,
}

/// An appeal as returned to admins.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppealResponse {
    pub id: String,
    pub user_id: String,
    pub user_role: String,
    pub suspension_reason: String,
    pub message: String,
    pub created_at: String,
}

impl From<appeal::Model> for AppealResponse {
    fn from(a: appeal::Model) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            user_role: a.user_role.as_str().to_string(),
            suspension_reason: a.suspension_reason,
            message: a.message,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// Appeal service.
#[derive(Clone)]
pub struct AppealService {
    user_repo: UserRepository,
    appeal_repo: AppealRepository,
    id_gen: IdGenerator,
}

impl AppealService {
    /// Create a new appeal service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, appeal_repo: AppealRepository) -> Self {
        Self {
            user_repo,
            appeal_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit an appeal.
    ///
    /// The user must be currently suspended; otherwise the distinct
    /// `NOT_SUSPENDED` error is returned so clients can redirect. Role
    /// and suspension reason are denormalized from the user row at
    /// submission time, never taken from the client. Appeals are
    /// append-only: duplicates are permitted and nothing here touches
    /// suspension state.
    pub async fn submit(&self, input: SubmitAppealInput) -> AppResult<appeal::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(&input.user_id).await?;

        if !user.is_suspended {
            return Err(AppError::NotSuspended);
        }

        let model = appeal::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            user_role: Set(user.role),
            suspension_reason: Set(user.suspension_reason.unwrap_or_default()),
            message: Set(input.message),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.appeal_repo.create(model).await?;

        tracing::info!(user_id = %user.id, appeal_id = %created.id, "Appeal submitted");

        Ok(created)
    }

    /// List appeals for admin review, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<AppealResponse>> {
        let appeals = self.appeal_repo.list(limit, offset).await?;
        Ok(appeals.into_iter().map(AppealResponse::from).collect())
    }
}
