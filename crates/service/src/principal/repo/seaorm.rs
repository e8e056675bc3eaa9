use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use models::{principal, provider_password};

use crate::authdata::AuthData;
use crate::errors::ServiceError;
use crate::principal::domain::{CredentialRecord, IdentityRecord, PROVIDER_PASSWORD};
use crate::principal::repository::PrincipalRepository;

/// Repository over the `principal` and `provider_password` tables.
///
/// Borrows the caller's connection or transaction; the caller decides when
/// to commit.
pub struct SeaOrmPrincipalRepository<'c, C> {
    conn: &'c C,
    tenant_id: Uuid,
}

impl<'c, C: ConnectionTrait> SeaOrmPrincipalRepository<'c, C> {
    pub fn new(conn: &'c C, tenant_id: Uuid) -> Self { Self { conn, tenant_id } }
}

fn to_record(m: provider_password::Model) -> Result<CredentialRecord, ServiceError> {
    Ok(CredentialRecord {
        principal_id: m.principal_id,
        auth_data: AuthData::from_json(m.auth_data)?,
        password_hash: m.password_hash,
    })
}

#[async_trait]
impl<'c, C: ConnectionTrait> PrincipalRepository for SeaOrmPrincipalRepository<'c, C> {
    async fn insert_identity(&self, id: Uuid, user_id: &str) -> Result<(), ServiceError> {
        principal::insert(self.conn, id, self.tenant_id, PROVIDER_PASSWORD, user_id).await?;
        Ok(())
    }

    async fn insert_credential(&self, credential: CredentialRecord) -> Result<(), ServiceError> {
        let auth_data = credential.auth_data.to_json()?;
        provider_password::insert(self.conn, credential.principal_id, self.tenant_id, auth_data, credential.password_hash)
            .await?;
        Ok(())
    }

    async fn find_credentials_containing(&self, candidate: &AuthData) -> Result<Vec<CredentialRecord>, ServiceError> {
        let rows = provider_password::find_containing(self.conn, self.tenant_id, candidate.to_json()?).await?;
        rows.into_iter().map(to_record).collect()
    }

    async fn find_credentials_by_email(&self, email: &str) -> Result<Vec<CredentialRecord>, ServiceError> {
        let rows = provider_password::find_by_email(self.conn, self.tenant_id, email).await?;
        rows.into_iter().map(to_record).collect()
    }

    async fn find_credential(&self, principal_id: Uuid) -> Result<Option<CredentialRecord>, ServiceError> {
        provider_password::find_by_principal(self.conn, self.tenant_id, principal_id)
            .await?
            .map(to_record)
            .transpose()
    }

    async fn find_owner(&self, principal_id: Uuid) -> Result<Option<String>, ServiceError> {
        let row = principal::find(self.conn, self.tenant_id, principal_id, PROVIDER_PASSWORD).await?;
        Ok(row.map(|p| p.user_id))
    }

    async fn find_identities_by_user(&self, user_id: &str) -> Result<Vec<IdentityRecord>, ServiceError> {
        let rows = principal::find_by_user(self.conn, self.tenant_id, user_id, PROVIDER_PASSWORD).await?;
        Ok(rows.into_iter().map(|p| IdentityRecord { id: p.id, user_id: p.user_id }).collect())
    }

    async fn update_credential(&self, credential: CredentialRecord) -> Result<u64, ServiceError> {
        let auth_data = credential.auth_data.to_json()?;
        let n = provider_password::update_credential(
            self.conn,
            self.tenant_id,
            credential.principal_id,
            auth_data,
            credential.password_hash,
        )
        .await?;
        Ok(n)
    }
}
