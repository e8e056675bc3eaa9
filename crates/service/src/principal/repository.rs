use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{CredentialRecord, IdentityRecord};
use crate::authdata::AuthData;
use crate::errors::ServiceError;

/// Persistence for password principals of a single tenant.
///
/// Implementations translate store uniqueness failures on credentials into
/// [`ServiceError::DuplicateIdentifier`].
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    async fn insert_identity(&self, id: Uuid, user_id: &str) -> Result<(), ServiceError>;
    async fn insert_credential(&self, credential: CredentialRecord) -> Result<(), ServiceError>;

    /// Credentials whose stored auth data contains every entry of `candidate`.
    async fn find_credentials_containing(&self, candidate: &AuthData) -> Result<Vec<CredentialRecord>, ServiceError>;
    async fn find_credentials_by_email(&self, email: &str) -> Result<Vec<CredentialRecord>, ServiceError>;
    async fn find_credential(&self, principal_id: Uuid) -> Result<Option<CredentialRecord>, ServiceError>;

    async fn find_owner(&self, principal_id: Uuid) -> Result<Option<String>, ServiceError>;
    async fn find_identities_by_user(&self, user_id: &str) -> Result<Vec<IdentityRecord>, ServiceError>;

    /// Returns the number of credentials overwritten.
    async fn update_credential(&self, credential: CredentialRecord) -> Result<u64, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use crate::fields::FieldValue;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockPrincipalRepository {
        identities: Mutex<Vec<IdentityRecord>>,
        credentials: Mutex<Vec<CredentialRecord>>,
    }

    impl MockPrincipalRepository {
        /// Delete the identity row only, leaving its credential orphaned.
        pub fn remove_identity(&self, id: Uuid) {
            self.identities.lock().unwrap().retain(|i| i.id != id);
        }

        pub fn credentials(&self) -> Vec<CredentialRecord> {
            self.credentials.lock().unwrap().clone()
        }
    }

    fn sorted(mut v: Vec<CredentialRecord>) -> Vec<CredentialRecord> {
        v.sort_by_key(|c| c.principal_id);
        v
    }

    #[async_trait]
    impl PrincipalRepository for MockPrincipalRepository {
        async fn insert_identity(&self, id: Uuid, user_id: &str) -> Result<(), ServiceError> {
            if user_id.trim().is_empty() {
                return Err(ServiceError::invalid_argument("user_id required"));
            }
            self.identities.lock().unwrap().push(IdentityRecord { id, user_id: user_id.to_string() });
            Ok(())
        }

        async fn insert_credential(&self, credential: CredentialRecord) -> Result<(), ServiceError> {
            let mut creds = self.credentials.lock().unwrap();
            if creds.iter().any(|c| c.auth_data == credential.auth_data) {
                return Err(ServiceError::DuplicateIdentifier);
            }
            creds.push(credential);
            Ok(())
        }

        async fn find_credentials_containing(&self, candidate: &AuthData) -> Result<Vec<CredentialRecord>, ServiceError> {
            let creds = self.credentials.lock().unwrap();
            Ok(sorted(creds.iter().filter(|c| candidate.is_subset_of(&c.auth_data)).cloned().collect()))
        }

        async fn find_credentials_by_email(&self, email: &str) -> Result<Vec<CredentialRecord>, ServiceError> {
            let creds = self.credentials.lock().unwrap();
            Ok(sorted(
                creds
                    .iter()
                    .filter(|c| matches!(c.auth_data.get("email"), Some(FieldValue::String(e)) if e == email))
                    .cloned()
                    .collect(),
            ))
        }

        async fn find_credential(&self, principal_id: Uuid) -> Result<Option<CredentialRecord>, ServiceError> {
            let creds = self.credentials.lock().unwrap();
            Ok(creds.iter().find(|c| c.principal_id == principal_id).cloned())
        }

        async fn find_owner(&self, principal_id: Uuid) -> Result<Option<String>, ServiceError> {
            let ids = self.identities.lock().unwrap();
            Ok(ids.iter().find(|i| i.id == principal_id).map(|i| i.user_id.clone()))
        }

        async fn find_identities_by_user(&self, user_id: &str) -> Result<Vec<IdentityRecord>, ServiceError> {
            let ids = self.identities.lock().unwrap();
            Ok(ids.iter().filter(|i| i.user_id == user_id).cloned().collect())
        }

        async fn update_credential(&self, credential: CredentialRecord) -> Result<u64, ServiceError> {
            let mut creds = self.credentials.lock().unwrap();
            if creds
                .iter()
                .any(|c| c.principal_id != credential.principal_id && c.auth_data == credential.auth_data)
            {
                return Err(ServiceError::DuplicateIdentifier);
            }
            match creds.iter_mut().find(|c| c.principal_id == credential.principal_id) {
                Some(slot) => {
                    *slot = credential;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }
}
