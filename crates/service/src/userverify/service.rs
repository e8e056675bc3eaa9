use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info, instrument};

use super::code::{CodeGenerator, VerifyCode};
use super::sender::{CodeSender, CodeSenderRegistry};
use super::store::{UserProfileStore, VerifyCodeStore};
use crate::errors::ServiceError;
use crate::fields::{FieldMap, FieldValue};

/// Provider names accepted for a test delivery.
pub const TEST_SEND_PROVIDERS: &[&str] = &["smtp", "twilio", "nexmo"];

/// Issues verification codes for profile values such as `email`.
pub struct UserVerifyService<S: VerifyCodeStore, P: UserProfileStore> {
    codes: Arc<S>,
    profiles: Arc<P>,
    senders: CodeSenderRegistry,
    generator: Arc<dyn CodeGenerator>,
}

impl<S: VerifyCodeStore, P: UserProfileStore> UserVerifyService<S, P> {
    pub fn new(codes: Arc<S>, profiles: Arc<P>, senders: CodeSenderRegistry, generator: Arc<dyn CodeGenerator>) -> Self {
        Self { codes, profiles, senders, generator }
    }

    /// Store a fresh code for the user's `record_key` value and send it.
    #[instrument(skip(self), fields(user_id = %user_id, record_key = %record_key))]
    pub async fn request_verification(&self, user_id: &str, record_key: &str) -> Result<VerifyCode, ServiceError> {
        if record_key.is_empty() {
            return Err(ServiceError::invalid_field("empty record_key", "record_key"));
        }
        let sender = self
            .senders
            .get(record_key)
            .ok_or_else(|| ServiceError::invalid_field("invalid record_key", record_key))?;

        let profile = self.profiles.get_user_profile(user_id).await?;
        let value = match profile.get(record_key) {
            Some(FieldValue::String(v)) if !v.is_empty() => v.clone(),
            Some(_) => return Err(ServiceError::invalid_field(format!("value of {record_key} is not a string"), record_key)),
            None => return Err(ServiceError::invalid_field(format!("profile has no {record_key}"), record_key)),
        };

        let code = VerifyCode::new(user_id, record_key, &value, self.generator.generate());
        self.codes.create_verify_code(&code).await?;

        if let Err(e) = sender.send(&code, &profile).await {
            error!(error = %e, "verify_code_send_failed");
            return Err(e);
        }
        info!(verify_code_id = %code.id, "verify_code_sent");
        Ok(code)
    }
}

/// A dummy delivery to an arbitrary value, used by operators to check
/// provider settings. Nothing is stored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestSendRequest {
    #[serde(default)]
    pub record_key: String,
    #[serde(default)]
    pub record_value: String,
    #[serde(default)]
    pub provider_settings: HashMap<String, String>,
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

impl TestSendRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.record_key.is_empty() {
            return Err(ServiceError::invalid_field("empty record_key", "record_key"));
        }
        if self.record_value.is_empty() {
            return Err(ServiceError::invalid_field("empty record_value", "record_value"));
        }
        if self.provider_name().is_empty() {
            return Err(ServiceError::invalid_field("missing provider name", "provider_settings.name"));
        }
        Ok(())
    }

    pub fn provider_name(&self) -> &str {
        self.provider_settings.get("name").map(String::as_str).unwrap_or_default()
    }
}

/// Validate `req` and push a freshly generated code through `sender`.
#[instrument(skip_all, fields(record_key = %req.record_key, provider = %req.provider_name()))]
pub async fn send_test_code(
    req: &TestSendRequest,
    sender: &dyn CodeSender,
    generator: &dyn CodeGenerator,
) -> Result<(), ServiceError> {
    req.validate()?;
    if !TEST_SEND_PROVIDERS.contains(&req.provider_name()) {
        return Err(ServiceError::invalid_field("invalid provider name", "provider_settings.name"));
    }
    let code = VerifyCode::new("", &req.record_key, &req.record_value, generator.generate());
    let profile = FieldMap::new().with(req.record_key.clone(), req.record_value.clone());
    sender.send(&code, &profile).await?;
    info!(templates = req.templates.len(), "verify_code_test_sent");
    Ok(())
}
