use sea_orm_migration::prelude::*;

mod m20260401_000001_create_contacts;
mod m20260401_000002_create_check_ins;
mod m20260401_000003_create_scheduled_deadlines;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_contacts::Migration),
            Box::new(m20260401_000002_create_check_ins::Migration),
            Box::new(m20260401_000003_create_scheduled_deadlines::Migration),
        ]
    }
}
