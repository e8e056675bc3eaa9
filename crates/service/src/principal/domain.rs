use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::authdata::AuthData;

/// Provider name stored on every identity record created here.
pub const PROVIDER_PASSWORD: &str = "password";

/// A password principal: one identifier shape bound to one user.
#[derive(Clone, PartialEq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub user_id: String,
    pub auth_data: AuthData,
    /// Only set on the write path; never persisted.
    #[serde(skip)]
    pub plain_password: Option<String>,
    #[serde(skip)]
    pub hashed_password: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, auth_data: AuthData) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            auth_data,
            plain_password: None,
            hashed_password: String::new(),
        }
    }

    pub fn with_password(mut self, plain: impl Into<String>) -> Self {
        self.plain_password = Some(plain.into());
        self
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("auth_data", &self.auth_data)
            .field("plain_password", &self.plain_password.as_ref().map(|_| "<redacted>"))
            .field("hashed_password", &"<redacted>")
            .finish()
    }
}

/// Identity row: which user owns a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub user_id: String,
}

/// Provider row: the principal's auth data and password hash.
#[derive(Clone, PartialEq)]
pub struct CredentialRecord {
    pub principal_id: Uuid,
    pub auth_data: AuthData,
    pub password_hash: String,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("principal_id", &self.principal_id)
            .field("auth_data", &self.auth_data)
            .finish_non_exhaustive()
    }
}
