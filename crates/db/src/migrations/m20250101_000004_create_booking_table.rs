//! Create `booking` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Booking::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Booking::AdvertiserId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::PublisherId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::Placement).string_len(256).not_null())
                    .col(ColumnDef::new(Booking::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Booking::Currency).string_len(8).not_null())
                    .col(ColumnDef::new(Booking::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Booking::PaymentStatus).string_len(16).not_null())
                    .col(ColumnDef::new(Booking::CheckoutSessionId).string_len(128))
                    .col(
                        ColumnDef::new(Booking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Booking::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_advertiser")
                            .from(Booking::Table, Booking::AdvertiserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_publisher")
                            .from(Booking::Table, Booking::PublisherId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: checkout_session_id (webhook lookup)
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_checkout_session_id")
                    .table(Booking::Table)
                    .col(Booking::CheckoutSessionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: advertiser_id
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_advertiser_id")
                    .table(Booking::Table)
                    .col(Booking::AdvertiserId)
                    .to_owned(),
            )
            .await?;

        // Index: publisher_id
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_publisher_id")
                    .table(Booking::Table)
                    .col(Booking::PublisherId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at for listing order
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_created_at")
                    .table(Booking::Table)
                    .col(Booking::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Booking {
    Table,
    Id,
    AdvertiserId,
    PublisherId,
    Placement,
    AmountCents,
    Currency,
    Status,
    PaymentStatus,
    CheckoutSessionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
