//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::Email).string_len(256).not_null())
                    .col(ColumnDef::new(User::EmailLower).string_len(256).not_null())
                    .col(ColumnDef::new(User::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(User::LastName).string_len(128).not_null())
                    .col(ColumnDef::new(User::Role).string_len(16).not_null())
                    .col(ColumnDef::new(User::PasswordHash).string_len(256).not_null())
                    .col(ColumnDef::new(User::IsEmailVerified).boolean().not_null().default(false))
                    .col(ColumnDef::new(User::IsActivated).boolean().not_null().default(false))
                    .col(ColumnDef::new(User::IsSuspended).boolean().not_null().default(false))
                    .col(ColumnDef::new(User::SuspensionReason).text())
                    .col(ColumnDef::new(User::SuspendedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: email_lower (case-insensitive login lookup)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_email_lower")
                    .table(User::Table)
                    .col(User::EmailLower)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: role (admin user listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_role")
                    .table(User::Table)
                    .col(User::Role)
                    .to_owned(),
            )
            .await?;

        // Index: created_at
        manager
            .create_index(
                Index::create()
                    .name("idx_user_created_at")
                    .table(User::Table)
                    .col(User::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Email,
    EmailLower,
    FirstName,
    LastName,
    Role,
    PasswordHash,
    IsEmailVerified,
    IsActivated,
    IsSuspended,
    SuspensionReason,
    SuspendedAt,
    CreatedAt,
    UpdatedAt,
}
