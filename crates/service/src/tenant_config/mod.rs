//! Tenant configuration and its request-header transport.

mod codec;
mod model;

pub use codec::{
    decode, decode_bin, encode, encode_bin, set_tenant_config, tenant_config_from_headers, DecodeError,
    TENANT_CONFIG_BIN_VERSION, TENANT_CONFIG_HEADER,
};
pub use model::{
    SmtpConfiguration, SsoConfiguration, SsoSetting, TenantConfiguration, TokenStoreConfiguration,
    UserAuditConfiguration, UserProfileConfiguration, UserVerifyConfiguration, WelcomeEmailConfiguration,
};
