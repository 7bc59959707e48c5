//! Create `conversation` and `message` tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Conversation::AdvertiserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversation::PublisherId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Conversation::BookingId).string_len(32))
                    .col(
                        ColumnDef::new(Conversation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_advertiser")
                            .from(Conversation::Table, Conversation::AdvertiserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_publisher")
                            .from(Conversation::Table, Conversation::PublisherId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique: one conversation per advertiser/publisher pair
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_parties")
                    .table(Conversation::Table)
                    .col(Conversation::AdvertiserId)
                    .col(Conversation::PublisherId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Message::Id).string_len(32).not_null().primary_key())
                    .col(
                        ColumnDef::new(Message::ConversationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Message::SenderId).string_len(32).not_null())
                    .col(ColumnDef::new(Message::Body).text().not_null())
                    .col(
                        ColumnDef::new(Message::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Message::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_conversation")
                            .from(Message::Table, Message::ConversationId)
                            .to(Conversation::Table, Conversation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_sender")
                            .from(Message::Table, Message::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index for conversation history lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_message_conversation_created_at")
                    .table(Message::Table)
                    .col(Message::ConversationId)
                    .col(Message::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Message::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Conversation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Conversation {
    Table,
    Id,
    AdvertiserId,
    PublisherId,
    BookingId,
    CreatedAt,
}

#[derive(Iden)]
enum Message {
    Table,
    Id,
    ConversationId,
    SenderId,
    Body,
    IsRead,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
