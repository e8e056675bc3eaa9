use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use configs::HashingConfig;

use crate::errors::ServiceError;

/// Argon2id hasher with fixed cost parameters.
#[derive(Debug, Clone, Default)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(params: Params) -> Self { Self { params } }

    pub fn from_config(cfg: &HashingConfig) -> Result<Self, ServiceError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| ServiceError::HashFailure(e.to_string()))?;
        Ok(Self { params })
    }

    /// Minimum argon2 costs. Only meant for tests and benchmarks.
    pub fn low_cost() -> Self {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None).unwrap_or_default();
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ServiceError::HashFailure(e.to_string()))
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, plain: &str) -> Result<String, ServiceError> {
        let hasher = self.clone();
        let plain = plain.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| ServiceError::HashFailure(format!("hash task failed: {e}")))?
    }

    /// False for a mismatch and for a hash that does not parse.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self.argon2().verify_password(plain.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    pub async fn verify_blocking(&self, plain: &str, hash: &str) -> bool {
        let hasher = self.clone();
        let (plain, hash) = (plain.to_owned(), hash.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash)).await.unwrap_or(false)
    }
}
