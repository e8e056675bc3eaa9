use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{debug, instrument};
use uuid::Uuid;

use configs::StaticTenant;
use models::tenant;

use crate::errors::ServiceError;
use crate::tenant_config::TenantConfiguration;

/// Domain to tenant configuration lookup used by the edge.
#[async_trait]
pub trait TenantRegistry: Send + Sync {
    async fn resolve_by_domain(&self, domain: &str) -> Result<TenantConfiguration, ServiceError>;
}

/// Parse a stored configuration document and stamp the row id onto it.
pub fn config_from_row(row: tenant::Model) -> Result<TenantConfiguration, ServiceError> {
    let mut cfg: TenantConfiguration = serde_json::from_value(row.config)
        .map_err(|e| ServiceError::Encoding(format!("tenant config: {e}")))?;
    cfg.tenant_id = row.id;
    Ok(cfg)
}

/// Registry over the `tenant` table.
pub struct SeaOrmTenantRegistry {
    pub db: DatabaseConnection,
}

#[async_trait]
impl TenantRegistry for SeaOrmTenantRegistry {
    #[instrument(skip(self))]
    async fn resolve_by_domain(&self, domain: &str) -> Result<TenantConfiguration, ServiceError> {
        let row = tenant::find_by_domain(&self.db, domain)
            .await?
            .ok_or_else(|| ServiceError::not_found("tenant"))?;
        debug!(tenant_id = %row.id, "tenant_resolved");
        config_from_row(row)
    }
}

/// Register a tenant with its configuration document.
pub async fn create_tenant<C: ConnectionTrait>(
    db: &C,
    name: &str,
    domain: &str,
    config: &TenantConfiguration,
) -> Result<TenantConfiguration, ServiceError> {
    let doc = serde_json::to_value(config).map_err(|e| ServiceError::Encoding(e.to_string()))?;
    let row = tenant::create(db, name, domain, doc).await?;
    config_from_row(row)
}

/// Fixed set of tenants from `config.toml`, for single-tenant and dev setups.
#[derive(Debug, Default)]
pub struct StaticTenantRegistry {
    tenants: HashMap<String, TenantConfiguration>,
}

impl StaticTenantRegistry {
    /// Tenants without an explicit id get one derived from their domain, so
    /// ids stay stable across restarts.
    pub fn from_config(entries: &[StaticTenant]) -> Result<Self, ServiceError> {
        let mut tenants = HashMap::with_capacity(entries.len());
        for entry in entries {
            let domain = tenant::normalize_domain(&entry.domain);
            let mut cfg: TenantConfiguration = serde_json::from_value(entry.config.clone())
                .map_err(|e| ServiceError::invalid_argument(format!("tenant {domain}: {e}")))?;
            if cfg.tenant_id.is_nil() {
                cfg.tenant_id = Uuid::new_v5(&Uuid::NAMESPACE_DNS, domain.as_bytes());
            }
            tenants.insert(domain, cfg);
        }
        Ok(Self { tenants })
    }

    pub fn with_tenant(mut self, domain: &str, cfg: TenantConfiguration) -> Self {
        self.tenants.insert(tenant::normalize_domain(domain), cfg);
        self
    }

    pub fn len(&self) -> usize { self.tenants.len() }

    pub fn is_empty(&self) -> bool { self.tenants.is_empty() }
}

#[async_trait]
impl TenantRegistry for StaticTenantRegistry {
    async fn resolve_by_domain(&self, domain: &str) -> Result<TenantConfiguration, ServiceError> {
        self.tenants
            .get(&tenant::normalize_domain(domain))
            .cloned()
            .ok_or_else(|| ServiceError::not_found("tenant"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_db;
    use sea_orm::TransactionTrait;
    use serde_json::json;

    #[tokio::test]
    async fn static_registry_normalizes_domains() {
        let reg = StaticTenantRegistry::from_config(&[StaticTenant {
            domain: "Demo.Example.com".into(),
            config: json!({ "app_name": "demo", "api_key": "k" }),
        }])
        .unwrap();
        let cfg = reg.resolve_by_domain(" demo.example.COM").await.unwrap();
        assert_eq!(cfg.app_name, "demo");
        assert_eq!(cfg.tenant_id, Uuid::new_v5(&Uuid::NAMESPACE_DNS, b"demo.example.com"));
        assert!(matches!(reg.resolve_by_domain("other.example.com").await, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn static_registry_rejects_malformed_config() {
        let err = StaticTenantRegistry::from_config(&[StaticTenant {
            domain: "x.example.com".into(),
            config: json!({ "auth_record_keys": "not-a-list" }),
        }])
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn tenant_roundtrip_through_postgres() -> Result<(), anyhow::Error> {
        let Some(db) = setup_db().await else { return Ok(()) };
        let txn = db.begin().await?;
        let suffix = Uuid::new_v4();
        let domain = format!("reg-{suffix}.example.com");
        let cfg = TenantConfiguration { app_name: "reg".into(), api_key: "k".into(), ..Default::default() };
        let created = create_tenant(&txn, &format!("reg-{suffix}"), &domain, &cfg).await?;
        assert!(!created.tenant_id.is_nil());

        let row = tenant::find_by_domain(&txn, &domain).await?.expect("row");
        let loaded = config_from_row(row)?;
        assert_eq!(loaded.tenant_id, created.tenant_id);
        assert_eq!(loaded.api_key, "k");
        txn.rollback().await?;
        Ok(())
    }
}
