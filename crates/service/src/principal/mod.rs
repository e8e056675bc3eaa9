//! Password principals: domain, hashing, persistence and the store.

pub mod domain;
pub mod hashing;
pub mod repo;
pub mod repository;
pub mod service;

pub use domain::{CredentialRecord, IdentityRecord, Principal, PROVIDER_PASSWORD};
pub use hashing::CredentialHasher;
pub use repository::PrincipalRepository;
pub use service::PrincipalStore;
