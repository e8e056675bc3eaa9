use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use tracing::instrument;

use service::principal::Principal;

use super::bad_json;
use crate::errors::ApiError;
use crate::state::{AppState, TenantContext};

#[derive(Debug, Deserialize)]
pub struct ByEmailRequest {
    pub email: String,
}

/// Principals whose auth data holds exactly this email. Password material
/// is never serialized.
#[instrument(skip_all, fields(tenant_id = %tenant.0.tenant_id))]
pub async fn principals_by_email(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    payload: Result<Json<ByEmailRequest>, JsonRejection>,
) -> Result<Json<Vec<Principal>>, ApiError> {
    let Json(input) = payload.map_err(bad_json)?;
    let store = state.principal_store(&state.db, tenant.0.as_ref());
    let found = state.within(store.lookup_by_email(&input.email)).await?;
    Ok(Json(found))
}
