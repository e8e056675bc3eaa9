use async_trait::async_trait;
use axum::http::request::Parts;

use service::errors::ServiceError;
use service::tenant_config::TenantConfiguration;

/// The user a request is authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: String,
    pub disabled: bool,
}

/// Resolves the caller's session (token, cookie, ...). Session issuance
/// lives outside this server.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, req: &Parts, tenant: &TenantConfiguration) -> Result<Option<SessionUser>, ServiceError>;
}

/// Treats every caller as anonymous.
#[derive(Debug, Default, Clone)]
pub struct AnonymousSessions;

#[async_trait]
impl SessionResolver for AnonymousSessions {
    async fn resolve(&self, _req: &Parts, _tenant: &TenantConfiguration) -> Result<Option<SessionUser>, ServiceError> {
        Ok(None)
    }
}
