use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use models::verify_code;

use super::code::VerifyCode;
use super::UserProfile;
use crate::errors::ServiceError;
use crate::principal::PrincipalRepository;

#[async_trait]
pub trait VerifyCodeStore: Send + Sync {
    async fn create_verify_code(&self, code: &VerifyCode) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait UserProfileStore: Send + Sync {
    async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, ServiceError>;
}

/// `verify_code` table, scoped to one tenant.
pub struct SeaOrmVerifyCodeStore<'c, C> {
    conn: &'c C,
    tenant_id: Uuid,
}

impl<'c, C: ConnectionTrait> SeaOrmVerifyCodeStore<'c, C> {
    pub fn new(conn: &'c C, tenant_id: Uuid) -> Self { Self { conn, tenant_id } }
}

#[async_trait]
impl<'c, C: ConnectionTrait> VerifyCodeStore for SeaOrmVerifyCodeStore<'c, C> {
    async fn create_verify_code(&self, code: &VerifyCode) -> Result<(), ServiceError> {
        let row = verify_code::Model {
            id: code.id,
            tenant_id: self.tenant_id,
            user_id: code.user_id.clone(),
            record_key: code.record_key.clone(),
            record_value: code.record_value.clone(),
            code: code.code.clone(),
            consumed: code.consumed,
            created_at: code.created_at.into(),
        };
        verify_code::insert(self.conn, row).await?;
        Ok(())
    }
}

/// Profile made of the union of the user's password auth data, so that
/// identifiers such as `email` can be verified without a profile service.
pub struct AuthDataProfileStore<R: PrincipalRepository> {
    repo: Arc<R>,
}

impl<R: PrincipalRepository> AuthDataProfileStore<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }
}

#[async_trait]
impl<R: PrincipalRepository> UserProfileStore for AuthDataProfileStore<R> {
    async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, ServiceError> {
        let identities = self.repo.find_identities_by_user(user_id).await?;
        if identities.is_empty() {
            return Err(ServiceError::not_found("user profile"));
        }
        let mut profile = UserProfile::new();
        for identity in identities {
            if let Some(credential) = self.repo.find_credential(identity.id).await? {
                profile = profile.merged(&credential.auth_data);
            }
        }
        Ok(profile)
    }
}

pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockVerifyCodeStore {
        codes: Mutex<Vec<VerifyCode>>,
    }

    impl MockVerifyCodeStore {
        pub fn codes(&self) -> Vec<VerifyCode> { self.codes.lock().unwrap().clone() }
    }

    #[async_trait]
    impl VerifyCodeStore for MockVerifyCodeStore {
        async fn create_verify_code(&self, code: &VerifyCode) -> Result<(), ServiceError> {
            self.codes.lock().unwrap().push(code.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockUserProfileStore {
        profiles: HashMap<String, UserProfile>,
    }

    impl MockUserProfileStore {
        pub fn with_profile(mut self, user_id: &str, profile: UserProfile) -> Self {
            self.profiles.insert(user_id.to_string(), profile);
            self
        }
    }

    #[async_trait]
    impl UserProfileStore for MockUserProfileStore {
        async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, ServiceError> {
            self.profiles.get(user_id).cloned().ok_or_else(|| ServiceError::not_found("user profile"))
        }
    }
}
