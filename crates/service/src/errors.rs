use serde_json::{json, Value};
use thiserror::Error;

use models::errors::ModelError;

use crate::audit::PasswordViolation;
use crate::authz::AccessDenied;
use crate::tenant_config::DecodeError;

/// Error taxonomy shared by every component of the auth core.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String, fields: Vec<String> },
    #[error("authorization denied: {0}")]
    AuthorizationDenied(#[from] AccessDenied),
    /// Never carries the colliding identifier.
    #[error("identifier already in use")]
    DuplicateIdentifier,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("tenant configuration decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("password rejected: {0}")]
    PolicyViolation(#[from] PasswordViolation),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("password hashing failed: {0}")]
    HashFailure(String),
    #[error("invalid credentials")]
    InvalidCredentials,
}

impl ServiceError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument { message: message.into(), fields: Vec::new() }
    }

    pub fn invalid_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidArgument { message: message.into(), fields: vec![field.into()] }
    }

    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::InvalidArgument { .. } => 1001,
            ServiceError::AuthorizationDenied(_) => 1002,
            ServiceError::DuplicateIdentifier => 1003,
            ServiceError::NotFound(_) => 1004,
            ServiceError::InvalidCredentials => 1005,
            ServiceError::PolicyViolation(_) => 1006,
            ServiceError::Decode(_) => 1101,
            ServiceError::Encoding(_) => 1102,
            ServiceError::HashFailure(_) => 1103,
            ServiceError::StoreUnavailable(_) => 1200,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceError::InvalidArgument { .. } => "InvalidArgument",
            ServiceError::AuthorizationDenied(_) => "AuthorizationDenied",
            ServiceError::DuplicateIdentifier => "DuplicateIdentifier",
            ServiceError::NotFound(_) => "NotFound",
            ServiceError::InvalidCredentials => "InvalidCredentials",
            ServiceError::PolicyViolation(_) => "PolicyViolation",
            ServiceError::Decode(_) => "DecodeError",
            ServiceError::Encoding(_) => "EncodingError",
            ServiceError::HashFailure(_) => "HashFailure",
            ServiceError::StoreUnavailable(_) => "StoreUnavailable",
        }
    }

    /// Structured details a client can act on.
    pub fn info(&self) -> Option<Value> {
        match self {
            ServiceError::InvalidArgument { fields, .. } if !fields.is_empty() => {
                Some(json!({ "arguments": fields }))
            }
            ServiceError::AuthorizationDenied(denied) => serde_json::to_value(denied).ok(),
            ServiceError::PolicyViolation(violation) => serde_json::to_value(violation).ok(),
            _ => None,
        }
    }

    /// Failures that break the credential invariant rather than the request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ServiceError::HashFailure(_))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => ServiceError::invalid_argument(m),
            ModelError::UniqueViolation => ServiceError::DuplicateIdentifier,
            ModelError::Db(m) => ServiceError::StoreUnavailable(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_translates_to_duplicate_identifier() {
        let err: ServiceError = ModelError::UniqueViolation.into();
        assert!(matches!(err, ServiceError::DuplicateIdentifier));
        assert_eq!(err.to_string(), "identifier already in use");
        assert!(err.info().is_none());
    }

    #[test]
    fn store_errors_pass_through() {
        let err: ServiceError = ModelError::Db("connection reset".into()).into();
        assert!(matches!(err, ServiceError::StoreUnavailable(ref m) if m == "connection reset"));
        assert_eq!(err.code(), 1200);
    }

    #[test]
    fn policy_violation_carries_thresholds() {
        let err: ServiceError = PasswordViolation::TooShort { min_length: 8, pw_length: 5 }.into();
        let info = err.info().expect("info");
        assert_eq!(info["kind"], "too_short");
        assert_eq!(info["min_length"], 8);
        assert_eq!(info["pw_length"], 5);
    }

    #[test]
    fn only_hash_failure_is_fatal() {
        assert!(ServiceError::HashFailure("boom".into()).is_fatal());
        assert!(!ServiceError::DuplicateIdentifier.is_fatal());
    }
}
