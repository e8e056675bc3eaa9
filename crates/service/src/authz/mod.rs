//! Access policy engine: composable predicates over a per-request
//! [`AccessContext`].

mod context;
mod policy;

pub use context::{AccessContext, AccessKeyClass};
pub use policy::{
    deny_disabled_user, deny_no_access_key, enforce, require_authenticated, require_master_key, AccessDenied,
    AllOf, Policy,
};
