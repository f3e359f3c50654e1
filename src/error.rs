/// Error taxonomy shared by every request handler
///
/// Missing entities and entities owned by someone else surface as the same
/// `NotFoundOrAccessDenied` kind so callers cannot probe for existence.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of entity an access check was performed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Page,
    Database,
    Item,
    View,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Page => "Page",
            EntityKind::Database => "Database",
            EntityKind::Item => "Item",
            EntityKind::View => "View",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{kind} not found or access denied")]
    NotFoundOrAccessDenied { kind: EntityKind },

    #[error("{0}")]
    InvariantViolation(String),

    #[error("Upload failed with status {status}")]
    UploadFailure { status: u16 },

    #[error("Invalid value for field '{column}': {reason}")]
    InvalidField { column: String, reason: String },

    #[error("Resource not found")]
    NotFound,

    #[error("Request failed with status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T, E = WorkspaceError> = std::result::Result<T, E>;

/// JSON body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityKind>,
}

impl WorkspaceError {
    pub fn status(&self) -> StatusCode {
        match self {
            WorkspaceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            WorkspaceError::NotFoundOrAccessDenied { .. } | WorkspaceError::NotFound => {
                StatusCode::NOT_FOUND
            }
            WorkspaceError::InvariantViolation(_) => StatusCode::CONFLICT,
            WorkspaceError::UploadFailure { .. } | WorkspaceError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            WorkspaceError::InvalidField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WorkspaceError::Remote { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            WorkspaceError::Storage(_)
            | WorkspaceError::Serialization(_)
            | WorkspaceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            WorkspaceError::NotAuthenticated => "not_authenticated",
            WorkspaceError::NotFoundOrAccessDenied { .. } => "not_found_or_access_denied",
            WorkspaceError::InvariantViolation(_) => "invariant_violation",
            WorkspaceError::UploadFailure { .. } => "upload_failure",
            WorkspaceError::InvalidField { .. } => "invalid_field",
            WorkspaceError::NotFound => "not_found",
            WorkspaceError::Remote { .. } => "remote",
            WorkspaceError::Storage(_)
            | WorkspaceError::Serialization(_)
            | WorkspaceError::Io(_)
            | WorkspaceError::Transport(_) => "internal",
        }
    }

    /// Rebuild a typed error from a failed HTTP response
    pub fn from_response(status: u16, body: Option<ErrorBody>) -> Self {
        let Some(body) = body else {
            return WorkspaceError::Remote { status, message: String::new() };
        };
        match (body.error.as_str(), body.entity) {
            ("not_authenticated", _) => WorkspaceError::NotAuthenticated,
            ("not_found_or_access_denied", Some(kind)) => {
                WorkspaceError::NotFoundOrAccessDenied { kind }
            }
            ("invariant_violation", _) => WorkspaceError::InvariantViolation(body.message),
            ("not_found", _) => WorkspaceError::NotFound,
            _ => WorkspaceError::Remote { status, message: body.message },
        }
    }
}

impl IntoResponse for WorkspaceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self);
        }

        let entity = match &self {
            WorkspaceError::NotFoundOrAccessDenied { kind } => Some(*kind),
            _ => None,
        };
        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
            entity,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_round_trips_through_error_body() {
        let err = WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::View };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "View not found or access denied");

        let body = ErrorBody {
            error: err.code().to_string(),
            message: err.to_string(),
            entity: Some(EntityKind::View),
        };
        let rebuilt = WorkspaceError::from_response(404, Some(body));
        assert!(matches!(
            rebuilt,
            WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::View }
        ));
    }

    #[test]
    fn unknown_error_codes_become_remote() {
        let body = ErrorBody {
            error: "internal".to_string(),
            message: "boom".to_string(),
            entity: None,
        };
        match WorkspaceError::from_response(500, Some(body)) {
            WorkspaceError::Remote { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
