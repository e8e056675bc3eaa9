use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Principal: lookup by (tenant_id, user_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_principal_tenant_user")
                    .table(Principal::Table)
                    .col(Principal::TenantId)
                    .col(Principal::UserId)
                    .to_owned(),
            )
            .await?;

        // ProviderPassword: an identifier map may be used once per tenant
        manager
            .create_index(
                Index::create()
                    .name("uniq_provider_password_tenant_auth_data")
                    .table(ProviderPassword::Table)
                    .col(ProviderPassword::TenantId)
                    .col(ProviderPassword::AuthData)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Containment (@>) lookups need a GIN index; sea-query has no builder for the operator class.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_provider_password_auth_data \
                 ON provider_password USING GIN (auth_data jsonb_path_ops)",
            )
            .await?;

        // VerifyCode: lookup by (tenant_id, user_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_verify_code_tenant_user")
                    .table(VerifyCode::Table)
                    .col(VerifyCode::TenantId)
                    .col(VerifyCode::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_principal_tenant_user").table(Principal::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("uniq_provider_password_tenant_auth_data")
                    .table(ProviderPassword::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_provider_password_auth_data")
            .await?;
        manager
            .drop_index(Index::drop().name("idx_verify_code_tenant_user").table(VerifyCode::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Principal { Table, TenantId, UserId }

#[derive(DeriveIden)]
enum ProviderPassword { Table, TenantId, AuthData }

#[derive(DeriveIden)]
enum VerifyCode { Table, TenantId, UserId }
