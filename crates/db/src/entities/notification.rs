//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    #[sea_orm(string_value = "message")]
    Message,
    #[sea_orm(string_value = "bookingConfirmed")]
    BookingConfirmed,
    #[sea_orm(string_value = "paymentFailed")]
    PaymentFailed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification.
    pub user_id: String,

    pub notification_type: NotificationType,

    /// Short human-readable summary.
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Related record id (booking or conversation, by type).
    #[sea_orm(nullable)]
    pub reference_id: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

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
