//! Create `principal` table: one identity record per (provider, user).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Principal::Table)
                    .if_not_exists()
                    .col(uuid(Principal::Id).primary_key())
                    .col(uuid(Principal::TenantId).not_null())
                    .col(string_len(Principal::Provider, 64).not_null())
                    .col(string_len(Principal::UserId, 255).not_null())
                    .col(timestamp_with_time_zone(Principal::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_principal_tenant")
                            .from(Principal::Table, Principal::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Principal::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Principal { Table, Id, TenantId, Provider, UserId, CreatedAt }

#[derive(DeriveIden)]
enum Tenant { Table, Id }
