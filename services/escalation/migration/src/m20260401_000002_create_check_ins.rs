use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CheckIns::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CheckIns::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CheckIns::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(CheckIns::OwnerName).string().not_null())
                    .col(ColumnDef::new(CheckIns::Title).string().not_null())
                    .col(
                        ColumnDef::new(CheckIns::ScheduledTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CheckIns::EscalationDeadline)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CheckIns::Status)
                            .string_len(16)
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(
                        ColumnDef::new(CheckIns::VerificationCode)
                            .string_len(4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CheckIns::Contacts).json_binary().not_null())
                    .col(
                        ColumnDef::new(CheckIns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CheckIns::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CheckIns::AcknowledgedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(CheckIns::EscalatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Owner-scoped listing and lookups. Identity-less lookups go through the primary key.
        manager
            .create_index(
                Index::create()
                    .table(CheckIns::Table)
                    .col(CheckIns::OwnerId)
                    .col(CheckIns::Id)
                    .name("idx_check_ins_owner_id_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CheckIns::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CheckIns {
    Table,
    Id,
    OwnerId,
    OwnerName,
    Title,
    ScheduledTime,
    EscalationDeadline,
    Status,
    VerificationCode,
    Contacts,
    CreatedAt,
    UpdatedAt,
    AcknowledgedAt,
    EscalatedAt,
}
