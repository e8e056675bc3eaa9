//! Create `verify_code` table for outstanding verification requests.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerifyCode::Table)
                    .if_not_exists()
                    .col(uuid(VerifyCode::Id).primary_key())
                    .col(uuid(VerifyCode::TenantId).not_null())
                    .col(string_len(VerifyCode::UserId, 255).not_null())
                    .col(string_len(VerifyCode::RecordKey, 128).not_null())
                    .col(string_len(VerifyCode::RecordValue, 255).not_null())
                    .col(string_len(VerifyCode::Code, 64).not_null())
                    .col(boolean(VerifyCode::Consumed).not_null().default(false))
                    .col(timestamp_with_time_zone(VerifyCode::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(VerifyCode::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum VerifyCode { Table, Id, TenantId, UserId, RecordKey, RecordValue, Code, Consumed, CreatedAt }
