use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Extension, Json};
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use service::audit::PasswordAuditor;
use service::authdata::{AuthData, AuthDataResolver};
use service::authz::{AccessContext, AccessDenied};
use service::errors::ServiceError;
use service::fields::FieldMap;

use super::bad_json;
use crate::errors::{store_err, ApiError};
use crate::state::{AppState, TenantContext};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub auth_data: AuthData,
    pub password: String,
    /// Extra profile data; only used as context for the password audit.
    #[serde(default)]
    pub profile: FieldMap,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user_id: String,
    pub principal_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub auth_data: AuthData,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: String,
    pub principal_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub password: String,
}

#[instrument(skip_all, fields(tenant_id = %tenant.0.tenant_id))]
pub async fn signup(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, ApiError> {
    let Json(input) = payload.map_err(bad_json)?;
    let cfg = tenant.0.as_ref();

    AuthDataResolver::new(cfg.auth_record_keys.clone()).resolve_for_write(&input.auth_data)?;
    let auditor = PasswordAuditor::new(cfg.password_policy());
    auditor.validate(&input.password, &input.profile.merged(&input.auth_data))?;

    let user_id = Uuid::new_v4().to_string();
    let txn = state.db.begin().await.map_err(store_err)?;
    let created = {
        let store = state.principal_store(&txn, cfg);
        state.within(store.create_for_user(&user_id, &input.password, &input.auth_data)).await?
    };
    txn.commit().await.map_err(store_err)?;

    info!(user_id = %user_id, principals = created.len(), "user_signed_up");
    Ok(Json(SignupResponse { user_id, principal_ids: created.iter().map(|p| p.id).collect() }))
}

#[instrument(skip_all, fields(tenant_id = %tenant.0.tenant_id))]
pub async fn login(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(input) = payload.map_err(bad_json)?;
    let store = state.principal_store(&state.db, tenant.0.as_ref());

    let principals = match state.within(store.lookup_by_auth_data(&input.auth_data)).await {
        Ok(found) => found,
        Err(ServiceError::NotFound(_)) => return Err(ServiceError::InvalidCredentials.into()),
        Err(e) => return Err(e.into()),
    };
    for principal in &principals {
        if store.verify_password(principal, &input.password).await {
            info!(user_id = %principal.user_id, principal_id = %principal.id, "user_logged_in");
            return Ok(Json(LoginResponse { user_id: principal.user_id.clone(), principal_id: principal.id }));
        }
    }
    Err(ServiceError::InvalidCredentials.into())
}

#[instrument(skip_all, fields(tenant_id = %tenant.0.tenant_id))]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AccessContext>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(input) = payload.map_err(bad_json)?;
    let cfg = tenant.0.as_ref();
    let user_id = ctx.user_id().ok_or(ServiceError::AuthorizationDenied(AccessDenied::NotAuthenticated))?;

    let txn = state.db.begin().await.map_err(store_err)?;
    let updated = {
        let store = state.principal_store(&txn, cfg);
        let principals = state.within(store.lookup_by_user_id(user_id)).await?;

        let mut old_ok = false;
        for p in &principals {
            if store.verify_password(p, &input.old_password).await {
                old_ok = true;
                break;
            }
        }
        if !old_ok {
            return Err(ServiceError::InvalidCredentials.into());
        }

        let user_data = principals.iter().fold(FieldMap::new(), |acc, p| acc.merged(&p.auth_data));
        PasswordAuditor::new(cfg.password_policy()).validate(&input.password, &user_data)?;

        let n = principals.len();
        for p in principals {
            let p = p.with_password(input.password.clone());
            state.within(store.update(&p)).await?;
        }
        n
    };
    txn.commit().await.map_err(store_err)?;

    info!(user_id = %user_id, principals = updated, "password_changed");
    Ok(Json(serde_json::json!({ "result": "OK" })))
}
