//! Create `permission_grant` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PermissionGrant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PermissionGrant::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PermissionGrant::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PermissionGrant::Permission)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PermissionGrant::Module)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PermissionGrant::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_permission_grant_user")
                            .from(PermissionGrant::Table, PermissionGrant::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique: one grant per (user, module)
        manager
            .create_index(
                Index::create()
                    .name("idx_permission_grant_user_module")
                    .table(PermissionGrant::Table)
                    .col(PermissionGrant::UserId)
                    .col(PermissionGrant::Module)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PermissionGrant::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PermissionGrant {
    Table,
    Id,
    UserId,
    Permission,
    Module,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
