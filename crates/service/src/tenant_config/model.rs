use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::PasswordPolicy;

/// Full configuration of one tenant (app), secrets included.
///
/// `Debug` output redacts every secret; the value itself must never be
/// logged or echoed in a response.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantConfiguration {
    pub tenant_id: Uuid,
    pub db_connection_str: String,
    pub api_key: String,
    pub master_key: String,
    pub app_name: String,
    pub cors_host: String,
    pub token_store: TokenStoreConfiguration,
    pub user_profile: UserProfileConfiguration,
    pub user_audit: UserAuditConfiguration,
    pub smtp: SmtpConfiguration,
    pub welcome_email: WelcomeEmailConfiguration,
    pub sso_setting: SsoSetting,
    pub sso_providers: Vec<String>,
    pub sso_configs: Vec<SsoConfiguration>,
    /// Valid identifier key-sets, e.g. `[["username"], ["email"]]`.
    pub auth_record_keys: Vec<Vec<String>>,
    pub user_verify: UserVerifyConfiguration,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenStoreConfiguration {
    pub secret: String,
    pub expiry: i64,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfileConfiguration {
    pub impl_name: String,
    pub impl_store_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAuditConfiguration {
    pub enabled: bool,
    pub trail_handler_url: String,
    pub pw_min_length: i32,
    pub pw_uppercase_required: bool,
    pub pw_lowercase_required: bool,
    pub pw_digit_required: bool,
    pub pw_symbol_required: bool,
    pub pw_min_guessable_level: i32,
    pub pw_excluded_keywords: Vec<String>,
    pub pw_excluded_fields: Vec<String>,
    pub pw_history_size: i32,
    pub pw_history_days: i32,
    pub pw_expiry_days: i32,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfiguration {
    pub host: String,
    pub port: i32,
    pub mode: String,
    pub login: String,
    pub password: String,
}

impl Default for SmtpConfiguration {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 25,
            mode: "normal".into(),
            login: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WelcomeEmailConfiguration {
    pub enabled: bool,
    pub sender_name: String,
    pub sender: String,
    pub subject: String,
    pub reply_to_name: String,
    pub reply_to: String,
    pub text_url: String,
    pub html_url: String,
}

impl Default for WelcomeEmailConfiguration {
    fn default() -> Self {
        Self {
            enabled: false,
            sender_name: String::new(),
            sender: "no-reply@example.com".into(),
            subject: "Welcome!".into(),
            reply_to_name: String::new(),
            reply_to: String::new(),
            text_url: String::new(),
            html_url: String::new(),
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsoSetting {
    pub url_prefix: String,
    pub js_sdk_cdn_url: String,
    pub state_jwt_secret: String,
    pub auto_link_provider_keys: Vec<String>,
    pub allowed_callback_urls: Vec<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsoConfiguration {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

/// Profile record keys that may be verified, e.g. `["email", "phone"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserVerifyConfiguration {
    pub keys: Vec<String>,
}

impl TenantConfiguration {
    pub fn sso_config_by_name(&self, name: &str) -> Option<&SsoConfiguration> {
        self.sso_configs.iter().find(|c| c.name == name)
    }

    /// Values a log sink should scrub.
    pub fn sensitive_values(&self) -> Vec<&str> {
        [self.api_key.as_str(), self.master_key.as_str()]
            .into_iter()
            .filter(|v| !v.is_empty())
            .collect()
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::from(&self.user_audit)
    }
}

impl From<&UserAuditConfiguration> for PasswordPolicy {
    fn from(a: &UserAuditConfiguration) -> Self {
        PasswordPolicy {
            min_length: a.pw_min_length,
            uppercase_required: a.pw_uppercase_required,
            lowercase_required: a.pw_lowercase_required,
            digit_required: a.pw_digit_required,
            symbol_required: a.pw_symbol_required,
            min_guessable_level: a.pw_min_guessable_level,
            excluded_keywords: a.pw_excluded_keywords.clone(),
            excluded_fields: a.pw_excluded_fields.clone(),
            history_size: a.pw_history_size,
            history_days: a.pw_history_days,
            expiry_days: a.pw_expiry_days,
        }
    }
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for TenantConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantConfiguration")
            .field("tenant_id", &self.tenant_id)
            .field("app_name", &self.app_name)
            .field("db_connection_str", &REDACTED)
            .field("api_key", &REDACTED)
            .field("master_key", &REDACTED)
            .field("cors_host", &self.cors_host)
            .field("token_store", &self.token_store)
            .field("user_profile", &self.user_profile)
            .field("user_audit", &self.user_audit)
            .field("smtp", &self.smtp)
            .field("welcome_email", &self.welcome_email)
            .field("sso_setting", &self.sso_setting)
            .field("sso_providers", &self.sso_providers)
            .field("sso_configs", &self.sso_configs)
            .field("auth_record_keys", &self.auth_record_keys)
            .field("user_verify", &self.user_verify)
            .finish()
    }
}

impl fmt::Debug for TokenStoreConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStoreConfiguration")
            .field("secret", &REDACTED)
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl fmt::Debug for UserProfileConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserProfileConfiguration")
            .field("impl_name", &self.impl_name)
            .field("impl_store_url", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for SmtpConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfiguration")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("mode", &self.mode)
            .field("login", &self.login)
            .field("password", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for SsoSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoSetting")
            .field("url_prefix", &self.url_prefix)
            .field("js_sdk_cdn_url", &self.js_sdk_cdn_url)
            .field("state_jwt_secret", &REDACTED)
            .field("auto_link_provider_keys", &self.auto_link_provider_keys)
            .field("allowed_callback_urls", &self.allowed_callback_urls)
            .finish()
    }
}

impl fmt::Debug for SsoConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoConfiguration")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("scope", &self.scope)
            .finish()
    }
}
