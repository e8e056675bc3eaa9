use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::code::VerifyCode;
use super::UserProfile;
use crate::errors::ServiceError;

/// Delivers a verification code over one channel (mail, SMS, ...).
#[async_trait]
pub trait CodeSender: Send + Sync {
    async fn send(&self, code: &VerifyCode, profile: &UserProfile) -> Result<(), ServiceError>;
}

/// Senders keyed by record key.
#[derive(Clone, Default)]
pub struct CodeSenderRegistry {
    senders: HashMap<String, Arc<dyn CodeSender>>,
}

impl CodeSenderRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register(mut self, record_key: impl Into<String>, sender: Arc<dyn CodeSender>) -> Self {
        self.senders.insert(record_key.into(), sender);
        self
    }

    /// Register `sender` for every key in `record_keys`.
    pub fn for_keys(record_keys: &[String], sender: Arc<dyn CodeSender>) -> Self {
        record_keys
            .iter()
            .filter(|k| !k.is_empty())
            .fold(Self::new(), |reg, k| reg.register(k.clone(), sender.clone()))
    }

    pub fn get(&self, record_key: &str) -> Option<Arc<dyn CodeSender>> {
        self.senders.get(record_key).cloned()
    }
}

/// Sender that only records the dispatch in the log. Used when no delivery
/// channel is configured.
#[derive(Debug, Default, Clone)]
pub struct LogCodeSender;

#[async_trait]
impl CodeSender for LogCodeSender {
    async fn send(&self, code: &VerifyCode, _profile: &UserProfile) -> Result<(), ServiceError> {
        info!(verify_code_id = %code.id, user_id = %code.user_id, record_key = %code.record_key, "verify_code_dispatched");
        Ok(())
    }
}

pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Records every code it is asked to send; optionally fails.
    #[derive(Default)]
    pub struct RecordingCodeSender {
        sent: Mutex<Vec<VerifyCode>>,
        fail: bool,
    }

    impl RecordingCodeSender {
        pub fn failing() -> Self { Self { fail: true, ..Default::default() } }

        pub fn sent(&self) -> Vec<VerifyCode> { self.sent.lock().unwrap().clone() }
    }

    #[async_trait]
    impl CodeSender for RecordingCodeSender {
        async fn send(&self, code: &VerifyCode, _profile: &UserProfile) -> Result<(), ServiceError> {
            if self.fail {
                return Err(ServiceError::StoreUnavailable("delivery channel down".into()));
            }
            self.sent.lock().unwrap().push(code.clone());
            Ok(())
        }
    }
}
