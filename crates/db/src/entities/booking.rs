//! Sponsored-placement booking entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Booking lifecycle states.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Payment states, driven by provider webhook events.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The advertiser paying for the placement.
    pub advertiser_id: String,

    /// The publisher providing the placement.
    pub publisher_id: String,

    /// Human-readable placement description.
    pub placement: String,

    pub amount_cents: i64,

    /// ISO 4217 currency code.
    pub currency: String,

    pub status: BookingStatus,

    pub payment_status: PaymentStatus,

    /// Provider checkout session id, set when checkout begins.
    #[sea_orm(unique, nullable)]
    pub checkout_session_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AdvertiserId",
        to = "super::user::Column::Id"
    )]
    Advertiser,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PublisherId",
        to = "super::user::Column::Id"
    )]
    Publisher,
}

impl ActiveModelBehavior for ActiveModel {}
