//! User verification requests: issue a code for a profile value and hand it
//! to the sender registered for that record key.

mod code;
pub mod sender;
pub mod service;
pub mod store;

use crate::fields::FieldMap;

/// Profile data a verification reads its record value from.
pub type UserProfile = FieldMap;

pub use code::{CodeGenerator, NumericCodeGenerator, VerifyCode};
pub use sender::{CodeSender, CodeSenderRegistry, LogCodeSender};
pub use service::{send_test_code, TestSendRequest, UserVerifyService, TEST_SEND_PROVIDERS};
pub use store::{AuthDataProfileStore, SeaOrmVerifyCodeStore, UserProfileStore, VerifyCodeStore};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authdata::{AuthData, AuthDataResolver};
    use crate::principal::{repository::mock::MockPrincipalRepository, CredentialHasher, PrincipalStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn profile_is_union_of_auth_data() {
        let repo = Arc::new(MockPrincipalRepository::default());
        let resolver = AuthDataResolver::new(vec![vec!["username".into()], vec!["email".into()]]);
        let store = PrincipalStore::new(repo.clone(), resolver, CredentialHasher::low_cost());
        store
            .create_for_user("u1", "pw", &AuthData::new().with("username", "alice").with("email", "a@b.com"))
            .await
            .unwrap();

        let profiles = AuthDataProfileStore::new(repo);
        let p = profiles.get_user_profile("u1").await.unwrap();
        assert_eq!(p.get_str("email").unwrap(), "a@b.com");
        assert_eq!(p.get_str("username").unwrap(), "alice");
        assert!(profiles.get_user_profile("u2").await.is_err());
    }

    #[test]
    fn registry_for_keys_skips_empty_keys() {
        let reg = CodeSenderRegistry::for_keys(&["email".into(), String::new()], Arc::new(LogCodeSender));
        assert!(reg.get("email").is_some());
        assert!(reg.get("").is_none());
        assert!(reg.get("phone").is_none());
    }
}
