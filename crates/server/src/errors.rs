use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::{debug, error};

use models::errors::ModelError;
use service::audit::PasswordViolation;
use service::errors::ServiceError;
use service::tenant_config::DecodeError;

/// HTTP face of [`ServiceError`].
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self { ApiError(e) }
}

impl From<PasswordViolation> for ApiError {
    fn from(e: PasswordViolation) -> Self { ApiError(e.into()) }
}

impl From<DecodeError> for ApiError {
    fn from(e: DecodeError) -> Self { ApiError(e.into()) }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::DuplicateIdentifier => StatusCode::CONFLICT,
            ServiceError::PolicyViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Decode(_) | ServiceError::Encoding(_) | ServiceError::HashFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.0;
        if status.is_server_error() {
            error!(code = err.code(), name = err.name(), error = %err, "request failed");
        } else {
            debug!(code = err.code(), name = err.name(), "request rejected");
        }
        // 5xx details stay in the log; clients only see the kind
        let message = if status.is_server_error() { public_message(status) } else { err.to_string() };
        let body = serde_json::json!({
            "error": {
                "name": err.name(),
                "code": err.code(),
                "message": message,
                "info": err.info(),
            }
        });
        (status, Json(body)).into_response()
    }
}

fn public_message(status: StatusCode) -> String {
    match status {
        StatusCode::SERVICE_UNAVAILABLE => "service temporarily unavailable".into(),
        _ => "internal error".into(),
    }
}

/// Connection and transaction errors from handlers.
pub fn store_err(e: DbErr) -> ApiError {
    ApiError(ModelError::from(e).into())
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
