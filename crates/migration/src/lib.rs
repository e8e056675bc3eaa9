//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_tenant;
mod m20240301_000002_create_principal;
mod m20240301_000003_create_provider_password;
mod m20240301_000004_create_verify_code;
mod m20240301_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_tenant::Migration),
            Box::new(m20240301_000002_create_principal::Migration),
            Box::new(m20240301_000003_create_provider_password::Migration),
            Box::new(m20240301_000004_create_verify_code::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000010_add_indexes::Migration),
        ]
    }
}
