#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Migrations run once per test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// Migrated connection, or `None` when database tests are skipped.
pub async fn setup_db() -> Option<DatabaseConnection> {
    let ok = *MIGRATED
        .get_or_init(|| async {
            let Some(db) = models::db::connect_for_tests().await else { return false };
            match migration::Migrator::up(&db, None).await {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("skip: migrate up failed: {}", e);
                    false
                }
            }
        })
        .await;
    if !ok {
        return None;
    }
    // fresh connection for the current test's runtime
    models::db::connect_for_tests().await
}
