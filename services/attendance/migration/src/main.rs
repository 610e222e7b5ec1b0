use sea_orm_migration::prelude::*;

use rollcall_attendance_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
