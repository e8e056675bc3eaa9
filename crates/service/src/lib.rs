//! Authentication and authorization core.
//! - `audit`: password policy checks.
//! - `authdata` / `principal`: identifier shapes and password principals.
//! - `authz`: access key classification and policy chains.
//! - `tenant_config`: per-tenant configuration and its header transport.
//! - `userverify`: verification code requests.

pub mod errors;
pub mod fields;
pub mod audit;
pub mod authdata;
pub mod principal;
pub mod authz;
pub mod tenant_config;
pub mod tenant_service;
pub mod userverify;
#[cfg(test)]
pub mod test_support;
