use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScheduledDeadlines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduledDeadlines::CheckInId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScheduledDeadlines::EscalationDeadline)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ScheduledDeadlines::Table, ScheduledDeadlines::CheckInId)
                            .to(CheckIns::Table, CheckIns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Sweep query: deadline <= now ORDER BY deadline.
        manager
            .create_index(
                Index::create()
                    .table(ScheduledDeadlines::Table)
                    .col(ScheduledDeadlines::EscalationDeadline)
                    .col(ScheduledDeadlines::CheckInId)
                    .name("idx_scheduled_deadlines_deadline")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduledDeadlines::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ScheduledDeadlines {
    Table,
    CheckInId,
    EscalationDeadline,
}

#[derive(Iden)]
enum CheckIns {
    Table,
    Id,
}
