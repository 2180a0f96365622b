use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::criteria::CriteriaError;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "error": "Bad Request",
    "message": "A new shipment cannot already have an ID",
    "entityName": "shipment",
    "errorKey": "idexists",
    "requestId": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    #[schema(example = "Bad Request")]
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Entity the failing request was about, for alert-style errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "shipment")]
    pub entity_name: Option<String>,
    /// Machine-readable key (`idexists`, `idnull`, `idinvalid`, `idnotfound`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "idexists")]
    pub error_key: Option<String>,
    /// Unique request identifier for support and debugging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Rejected request tied to an entity, rendered with an `X-<app>-error` header
    #[error("{message}")]
    BadRequestAlert {
        message: String,
        entity_name: String,
        error_key: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An update-by-id touched no row: the entity vanished underneath the caller
    #[error("Conflicting update: {entity} with id {id} no longer exists")]
    ConflictingUpdate { entity: String, id: i64 },

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<CriteriaError> for ServiceError {
    fn from(err: CriteriaError) -> Self {
        ServiceError::BadRequest(err.to_string())
    }
}

impl ServiceError {
    pub fn bad_request_alert(
        message: impl Into<String>,
        entity_name: impl Into<String>,
        error_key: impl Into<String>,
    ) -> Self {
        ServiceError::BadRequestAlert {
            message: message.into(),
            entity_name: entity_name.into(),
            error_key: error_key.into(),
        }
    }

    /// Wraps a string message as a database failure.
    pub fn database_error_message(message: impl Into<String>) -> Self {
        ServiceError::DatabaseError(DbErr::Custom(message.into()))
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::BadRequestAlert { .. } | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ConflictingUpdate { .. } => StatusCode::CONFLICT,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    fn alert_parts(&self) -> (Option<String>, Option<String>) {
        match self {
            Self::BadRequestAlert {
                entity_name,
                error_key,
                ..
            } => (Some(entity_name.clone()), Some(error_key.clone())),
            Self::ConflictingUpdate { entity, .. } => {
                (Some(entity.clone()), Some("conflictingupdate".to_string()))
            }
            _ => (None, None),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let (entity_name, error_key) = self.alert_parts();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            entity_name,
            error_key: error_key.clone(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let mut response = (status, Json(err)).into_response();
        if let Some(key) = error_key {
            let app = crate::handlers::common::application_name();
            let header = format!("x-{}-error", app.to_ascii_lowercase());
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(header),
                HeaderValue::from_str(&format!("error.{key}")),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}
