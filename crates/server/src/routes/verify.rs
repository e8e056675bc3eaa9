use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Extension, Json};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use tracing::instrument;

use service::authz::{AccessContext, AccessDenied};
use service::errors::ServiceError;
use service::principal::repo::SeaOrmPrincipalRepository;
use service::userverify::{
    send_test_code, AuthDataProfileStore, CodeSenderRegistry, NumericCodeGenerator, SeaOrmVerifyCodeStore,
    TestSendRequest, UserVerifyService,
};

use super::bad_json;
use crate::errors::{store_err, ApiError};
use crate::state::{AppState, TenantContext};

#[derive(Debug, Deserialize)]
pub struct VerifyRequestPayload {
    #[serde(default)]
    pub record_key: String,
}

#[instrument(skip_all, fields(tenant_id = %tenant.0.tenant_id))]
pub async fn verify_request(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AccessContext>,
    payload: Result<Json<VerifyRequestPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(input) = payload.map_err(bad_json)?;
    let cfg = tenant.0.as_ref();
    let user_id = ctx.user_id().ok_or(ServiceError::AuthorizationDenied(AccessDenied::NotAuthenticated))?;

    let txn = state.db.begin().await.map_err(store_err)?;
    {
        let svc = UserVerifyService::new(
            Arc::new(SeaOrmVerifyCodeStore::new(&txn, cfg.tenant_id)),
            Arc::new(AuthDataProfileStore::new(Arc::new(SeaOrmPrincipalRepository::new(&txn, cfg.tenant_id)))),
            CodeSenderRegistry::for_keys(&cfg.user_verify.keys, state.code_sender.clone()),
            Arc::new(NumericCodeGenerator::default()),
        );
        state.within(svc.request_verification(user_id, &input.record_key)).await?;
    }
    txn.commit().await.map_err(store_err)?;
    Ok(Json(serde_json::json!({ "result": "OK" })))
}

/// Master-key only. Sends a dummy code to `record_value` without a session or
/// any store access.
#[instrument(skip_all, fields(tenant_id = %tenant.0.tenant_id))]
pub async fn verify_request_test(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    payload: Result<Json<TestSendRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(input) = payload.map_err(bad_json)?;
    state
        .within(send_test_code(&input, state.code_sender.as_ref(), &NumericCodeGenerator::default()))
        .await?;
    Ok(Json(serde_json::json!({ "result": "OK" })))
}
