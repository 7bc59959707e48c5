//! Admin permission grant entity.
//!
//! One row per (admin, permission, module) triple. Replaces the older
//! pattern of a JSON-encoded permissions blob inside a text column.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What an admin may do within a module.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[sea_orm(string_value = "read")]
    Read,
    #[sea_orm(string_value = "write")]
    Write,
    #[sea_orm(string_value = "manage")]
    Manage,
}

/// Back-office modules an admin can be granted access to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Module {
    #[sea_orm(string_value = "users")]
    Users,
    #[sea_orm(string_value = "bookings")]
    Bookings,
    #[sea_orm(string_value = "payments")]
    Payments,
    #[sea_orm(string_value = "appeals")]
    Appeals,
    #[sea_orm(string_value = "reports")]
    Reports,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "permission_grant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The admin account holding the grant.
    pub user_id: String,

    pub permission: Permission,

    pub module: Module,

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
