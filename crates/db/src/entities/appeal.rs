//! Suspension appeal entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Appeal model - a suspended user's request for suspension review.
///
/// Append-only: appeals carry no status field and are reviewed out-of-band
/// by an administrator, who toggles the user's suspension flag directly.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appeal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The suspended user who submitted the appeal.
    pub user_id: String,

    /// The user's role at submission time.
    pub user_role: super::user::Role,

    /// Copy of the suspension reason at submission time.
    #[sea_orm(column_type = "Text")]
    pub suspension_reason: String,

    /// Free-text appeal message.
    #[sea_orm(column_type = "Text")]
    pub message: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
