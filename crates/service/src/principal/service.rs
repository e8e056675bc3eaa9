use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{CredentialRecord, Principal};
use super::hashing::CredentialHasher;
use super::repository::PrincipalRepository;
use crate::authdata::{check_value_lengths, AuthData, AuthDataResolver};
use crate::errors::ServiceError;

/// Password principal store bound to one tenant's key-sets.
pub struct PrincipalStore<R: PrincipalRepository> {
    repo: Arc<R>,
    resolver: AuthDataResolver,
    hasher: CredentialHasher,
}

impl<R: PrincipalRepository> PrincipalStore<R> {
    pub fn new(repo: Arc<R>, resolver: AuthDataResolver, hasher: CredentialHasher) -> Self {
        Self { repo, resolver, hasher }
    }

    pub fn resolver(&self) -> &AuthDataResolver { &self.resolver }

    /// Create one principal per key-set satisfied by `auth_data`, all owned
    /// by `user_id`. Each principal gets its own hash of the same password.
    /// Stops at the first failure; earlier principals stay written unless
    /// the caller rolls back.
    ///
    /// # Examples
    /// ```
    /// use service::authdata::{AuthData, AuthDataResolver};
    /// use service::principal::{repository::mock::MockPrincipalRepository, CredentialHasher, PrincipalStore};
    /// use std::sync::Arc;
    /// let resolver = AuthDataResolver::new(vec![vec!["username".into()], vec!["email".into()]]);
    /// let store = PrincipalStore::new(Arc::new(MockPrincipalRepository::default()), resolver, CredentialHasher::low_cost());
    /// let input = AuthData::new().with("username", "alice").with("email", "a@b.com");
    /// let created = tokio_test::block_on(store.create_for_user("u1", "Abc12345!", &input)).unwrap();
    /// assert_eq!(created.len(), 2);
    /// ```
    #[instrument(skip(self, plain_password, auth_data), fields(user_id = %user_id))]
    pub async fn create_for_user(
        &self,
        user_id: &str,
        plain_password: &str,
        auth_data: &AuthData,
    ) -> Result<Vec<Principal>, ServiceError> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::invalid_field("user_id required", "user_id"));
        }
        let shapes = self.resolver.resolve_for_write(auth_data)?;

        let mut created = Vec::with_capacity(shapes.len());
        for shape in shapes {
            let mut principal = Principal::new(user_id, shape);
            principal.hashed_password = self.hasher.hash_blocking(plain_password).await?;

            self.repo.insert_identity(principal.id, user_id).await?;
            self.repo
                .insert_credential(CredentialRecord {
                    principal_id: principal.id,
                    auth_data: principal.auth_data.clone(),
                    password_hash: principal.hashed_password.clone(),
                })
                .await?;
            info!(principal_id = %principal.id, "principal_created");
            created.push(principal);
        }
        Ok(created)
    }

    /// Principals whose stored auth data contains one of the shapes that
    /// `input` resolves to.
    ///
    /// # Examples
    /// ```
    /// use service::authdata::{AuthData, AuthDataResolver};
    /// use service::principal::{repository::mock::MockPrincipalRepository, CredentialHasher, PrincipalStore};
    /// use std::sync::Arc;
    /// let resolver = AuthDataResolver::new(vec![vec!["email".into()]]);
    /// let store = PrincipalStore::new(Arc::new(MockPrincipalRepository::default()), resolver, CredentialHasher::low_cost());
    /// let email = AuthData::new().with("email", "a@b.com");
    /// tokio_test::block_on(store.create_for_user("u1", "Abc12345!", &email)).unwrap();
    /// let found = tokio_test::block_on(store.lookup_by_auth_data(&email)).unwrap();
    /// assert_eq!(found[0].user_id, "u1");
    /// ```
    #[instrument(skip(self, input))]
    pub async fn lookup_by_auth_data(&self, input: &AuthData) -> Result<Vec<Principal>, ServiceError> {
        let mut seen = HashSet::new();
        let mut principals = Vec::new();
        for candidate in self.resolver.resolve(input) {
            let credentials = self.repo.find_credentials_containing(&candidate).await?;
            for credential in credentials {
                if seen.insert(credential.principal_id) {
                    principals.push(self.with_owner(credential).await?);
                }
            }
        }
        if principals.is_empty() {
            debug!("no principal matched auth data");
            return Err(ServiceError::not_found("principal"));
        }
        Ok(principals)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn lookup_by_user_id(&self, user_id: &str) -> Result<Vec<Principal>, ServiceError> {
        let identities = self.repo.find_identities_by_user(user_id).await?;
        if identities.is_empty() {
            return Err(ServiceError::not_found("principal"));
        }
        let mut principals = Vec::with_capacity(identities.len());
        for identity in identities {
            let Some(credential) = self.repo.find_credential(identity.id).await? else {
                warn!(principal_id = %identity.id, "password_record_missing");
                return Err(ServiceError::not_found("principal"));
            };
            principals.push(Principal {
                id: identity.id,
                user_id: identity.user_id,
                auth_data: credential.auth_data,
                plain_password: None,
                hashed_password: credential.password_hash,
            });
        }
        Ok(principals)
    }

    #[instrument(skip(self, email))]
    pub async fn lookup_by_email(&self, email: &str) -> Result<Vec<Principal>, ServiceError> {
        let credentials = self.repo.find_credentials_by_email(email).await?;
        if credentials.is_empty() {
            return Err(ServiceError::not_found("principal"));
        }
        let mut principals = Vec::with_capacity(credentials.len());
        for credential in credentials {
            principals.push(self.with_owner(credential).await?);
        }
        Ok(principals)
    }

    /// Re-hash `principal.plain_password` and overwrite auth data and hash.
    #[instrument(skip(self, principal), fields(principal_id = %principal.id))]
    pub async fn update(&self, principal: &Principal) -> Result<(), ServiceError> {
        let plain = principal
            .plain_password
            .as_deref()
            .ok_or_else(|| ServiceError::invalid_field("password required", "password"))?;
        check_value_lengths(&principal.auth_data)?;
        let password_hash = self.hasher.hash_blocking(plain).await?;
        let n = self
            .repo
            .update_credential(CredentialRecord {
                principal_id: principal.id,
                auth_data: principal.auth_data.clone(),
                password_hash,
            })
            .await?;
        if n == 0 {
            return Err(ServiceError::not_found("principal"));
        }
        info!("principal_updated");
        Ok(())
    }

    pub async fn verify_password(&self, principal: &Principal, plain: &str) -> bool {
        self.hasher.verify_blocking(plain, &principal.hashed_password).await
    }

    pub fn is_auth_data_valid(&self, input: &AuthData) -> bool {
        self.resolver.is_valid(input)
    }

    async fn with_owner(&self, credential: CredentialRecord) -> Result<Principal, ServiceError> {
        let id: Uuid = credential.principal_id;
        let Some(user_id) = self.repo.find_owner(id).await? else {
            warn!(principal_id = %id, "principal_owner_missing");
            return Err(ServiceError::not_found("principal owner"));
        };
        Ok(Principal {
            id,
            user_id,
            auth_data: credential.auth_data,
            plain_password: None,
            hashed_password: credential.password_hash,
        })
    }
}
