//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Marketplace roles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "publisher")]
    Publisher,
    #[sea_orm(string_value = "advertiser")]
    Advertiser,
}

impl Role {
    /// Stable string form used in tokens and responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Publisher => "publisher",
            Self::Advertiser => "advertiser",
        }
    }

    /// Parse a role from its string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "publisher" => Some(Self::Publisher),
            "advertiser" => Some(Self::Advertiser),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub email: String,

    /// Lowercased email, unique across all users.
    #[sea_orm(unique)]
    pub email_lower: String,

    pub first_name: String,

    pub last_name: String,

    pub role: Role,

    /// Argon2 password hash.
    pub password_hash: String,

    /// Has the email address been verified?
    #[sea_orm(default_value = false)]
    pub is_email_verified: bool,

    /// Has an administrator activated this account?
    #[sea_orm(default_value = false)]
    pub is_activated: bool,

    /// Is this account suspended?
    #[sea_orm(default_value = false)]
    pub is_suspended: bool,

    /// Reason for the suspension. Non-null whenever `is_suspended` is true.
    #[sea_orm(column_type = "Text", nullable)]
    pub suspension_reason: Option<String>,

    /// When the suspension was applied.
    #[sea_orm(nullable)]
    pub suspended_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::appeal::Entity")]
    Appeals,

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,

    #[sea_orm(has_many = "super::permission_grant::Entity")]
    PermissionGrants,
}

impl Related<super::appeal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appeals.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Related<super::permission_grant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PermissionGrants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Publisher, Role::Advertiser] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("moderator"), None);
    }
}
