use std::{future::Future, sync::Arc};

use axum::http::request::Parts;
use serde::Serialize;
use thiserror::Error;

use super::context::{AccessContext, AccessKeyClass};
use crate::errors::ServiceError;

/// Why a policy refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AccessDenied {
    #[error("API key required")]
    NoAccessKey,
    #[error("master key required")]
    MasterKeyRequired,
    #[error("authentication required")]
    NotAuthenticated,
    #[error("user is disabled")]
    UserDisabled,
}

/// An authorization predicate. Implementations must only read the context.
pub trait Policy: Send + Sync {
    fn evaluate(&self, req: &Parts, ctx: &AccessContext) -> Result<(), AccessDenied>;
}

impl<F> Policy for F
where
    F: Fn(&Parts, &AccessContext) -> Result<(), AccessDenied> + Send + Sync,
{
    fn evaluate(&self, req: &Parts, ctx: &AccessContext) -> Result<(), AccessDenied> {
        self(req, ctx)
    }
}

pub fn deny_no_access_key(_req: &Parts, ctx: &AccessContext) -> Result<(), AccessDenied> {
    match ctx.access_key {
        AccessKeyClass::Api | AccessKeyClass::Master => Ok(()),
        AccessKeyClass::None => Err(AccessDenied::NoAccessKey),
    }
}

pub fn require_master_key(_req: &Parts, ctx: &AccessContext) -> Result<(), AccessDenied> {
    if ctx.access_key == AccessKeyClass::Master {
        Ok(())
    } else {
        Err(AccessDenied::MasterKeyRequired)
    }
}

pub fn require_authenticated(_req: &Parts, ctx: &AccessContext) -> Result<(), AccessDenied> {
    if ctx.is_authenticated() {
        Ok(())
    } else {
        Err(AccessDenied::NotAuthenticated)
    }
}

pub fn deny_disabled_user(_req: &Parts, ctx: &AccessContext) -> Result<(), AccessDenied> {
    if ctx.is_user_disabled() {
        Err(AccessDenied::UserDisabled)
    } else {
        Ok(())
    }
}

/// Ordered chain; the first failing policy decides. An empty chain passes.
#[derive(Clone, Default)]
pub struct AllOf {
    policies: Vec<Arc<dyn Policy>>,
}

impl AllOf {
    pub fn new() -> Self { Self::default() }

    pub fn with<P: Policy + 'static>(mut self, policy: P) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }

    pub fn len(&self) -> usize { self.policies.len() }

    pub fn is_empty(&self) -> bool { self.policies.is_empty() }
}

impl Policy for AllOf {
    fn evaluate(&self, req: &Parts, ctx: &AccessContext) -> Result<(), AccessDenied> {
        for policy in &self.policies {
            policy.evaluate(req, ctx)?;
        }
        Ok(())
    }
}

/// Run `handler` only if `policy` passes for this request.
pub async fn enforce<P, F, Fut, T>(policy: &P, req: &Parts, ctx: &AccessContext, handler: F) -> Result<T, ServiceError>
where
    P: Policy + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    policy.evaluate(req, ctx)?;
    handler().await
}
