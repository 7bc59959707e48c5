//! Create `appeal` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appeal::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Appeal::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Appeal::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Appeal::UserRole).string_len(16).not_null())
                    .col(ColumnDef::new(Appeal::SuspensionReason).text().not_null())
                    .col(ColumnDef::new(Appeal::Message).text().not_null())
                    .col(
                        ColumnDef::new(Appeal::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appeal_user")
                            .from(Appeal::Table, Appeal::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_appeal_user_id")
                    .table(Appeal::Table)
                    .col(Appeal::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at for admin review ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_appeal_created_at")
                    .table(Appeal::Table)
                    .col(Appeal::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Appeal::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Appeal {
    Table,
    Id,
    UserId,
    UserRole,
    SuspensionReason,
    Message,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
