use sea_orm_migration::prelude::*;

use checkin_escalation_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
