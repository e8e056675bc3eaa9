use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectionTrait, DatabaseConnection};

use service::authdata::AuthDataResolver;
use service::errors::ServiceError;
use service::principal::repo::SeaOrmPrincipalRepository;
use service::principal::{CredentialHasher, PrincipalStore};
use service::tenant_config::TenantConfiguration;
use service::userverify::CodeSender;

use crate::session::SessionResolver;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub hasher: CredentialHasher,
    pub sessions: Arc<dyn SessionResolver>,
    /// Delivery channel for verification codes, shared by every record key.
    pub code_sender: Arc<dyn CodeSender>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Principal store for `tenant` over the given connection or transaction.
    pub fn principal_store<'c, C: ConnectionTrait>(
        &self,
        conn: &'c C,
        tenant: &TenantConfiguration,
    ) -> PrincipalStore<SeaOrmPrincipalRepository<'c, C>> {
        PrincipalStore::new(
            Arc::new(SeaOrmPrincipalRepository::new(conn, tenant.tenant_id)),
            AuthDataResolver::new(tenant.auth_record_keys.clone()),
            self.hasher.clone(),
        )
    }

    /// Bound `fut` by the per-request deadline.
    pub async fn within<T, F>(&self, fut: F) -> Result<T, ServiceError>
    where
        F: std::future::Future<Output = Result<T, ServiceError>>,
    {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .map_err(|_| ServiceError::StoreUnavailable("request deadline exceeded".into()))?
    }
}

/// Decoded configuration of the calling tenant, stored in request extensions.
#[derive(Clone)]
pub struct TenantContext(pub Arc<TenantConfiguration>);
