//! Create `provider_password` table holding the password credential of a
//! principal. `auth_data` is the identifying field map (jsonb).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProviderPassword::Table)
                    .if_not_exists()
                    .col(uuid(ProviderPassword::PrincipalId).primary_key())
                    .col(uuid(ProviderPassword::TenantId).not_null())
                    .col(json_binary(ProviderPassword::AuthData).not_null())
                    .col(string_len(ProviderPassword::PasswordHash, 255).not_null())
                    .col(timestamp_with_time_zone(ProviderPassword::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_password_principal")
                            .from(ProviderPassword::Table, ProviderPassword::PrincipalId)
                            .to(Principal::Table, Principal::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProviderPassword::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProviderPassword { Table, PrincipalId, TenantId, AuthData, PasswordHash, UpdatedAt }

#[derive(DeriveIden)]
enum Principal { Table, Id }
