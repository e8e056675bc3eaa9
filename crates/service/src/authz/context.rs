use serde::{Deserialize, Serialize};

use crate::tenant_config::TenantConfiguration;

/// Privilege tier derived from the key a request presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKeyClass {
    #[default]
    None,
    Api,
    Master,
}

impl AccessKeyClass {
    /// Compare the presented key with the tenant's master and API keys.
    /// Empty configured keys never match.
    pub fn classify(presented: Option<&str>, config: &TenantConfiguration) -> Self {
        let Some(key) = presented.filter(|k| !k.is_empty()) else {
            return AccessKeyClass::None;
        };
        if !config.master_key.is_empty() && constant_time_eq(key.as_bytes(), config.master_key.as_bytes()) {
            return AccessKeyClass::Master;
        }
        if !config.api_key.is_empty() && constant_time_eq(key.as_bytes(), config.api_key.as_bytes()) {
            return AccessKeyClass::Api;
        }
        AccessKeyClass::None
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Per-request facts the policies read. `Default` is the most restrictive
/// context: no key, nobody authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessContext {
    pub access_key: AccessKeyClass,
    pub user_id: Option<String>,
    pub user_disabled: bool,
}

impl AccessContext {
    pub fn new(access_key: AccessKeyClass) -> Self {
        Self { access_key, ..Default::default() }
    }

    pub fn with_user(mut self, user_id: impl Into<String>, disabled: bool) -> Self {
        self.user_id = Some(user_id.into());
        self.user_disabled = disabled;
        self
    }

    pub fn is_authenticated(&self) -> bool { self.user_id.is_some() }

    pub fn is_user_disabled(&self) -> bool { self.user_disabled }

    pub fn user_id(&self) -> Option<&str> { self.user_id.as_deref() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TenantConfiguration {
        TenantConfiguration { api_key: "api".into(), master_key: "master".into(), ..Default::default() }
    }

    #[test]
    fn classifies_presented_keys() {
        let c = config();
        assert_eq!(AccessKeyClass::classify(Some("master"), &c), AccessKeyClass::Master);
        assert_eq!(AccessKeyClass::classify(Some("api"), &c), AccessKeyClass::Api);
        assert_eq!(AccessKeyClass::classify(Some("apx"), &c), AccessKeyClass::None);
        assert_eq!(AccessKeyClass::classify(None, &c), AccessKeyClass::None);
    }

    #[test]
    fn empty_keys_never_match() {
        let c = TenantConfiguration::default();
        assert_eq!(AccessKeyClass::classify(Some(""), &c), AccessKeyClass::None);
        assert_eq!(AccessKeyClass::classify(Some("x"), &c), AccessKeyClass::None);
    }

    #[test]
    fn default_context_is_most_restrictive() {
        let ctx = AccessContext::default();
        assert_eq!(ctx.access_key, AccessKeyClass::None);
        assert!(!ctx.is_authenticated());
        assert!(ctx.user_id().is_none());
    }
}
