//! HTTP error response mapping.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use labhub_domain::error::{LabHubError, ValidationError, messages};

/// JSON error body returned by API endpoints.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Field-level validation errors, `{"field": ["message", ...]}`.
///
/// Documents the `422` body; the response itself is rendered straight from
/// the domain error.
#[derive(Serialize, ToSchema)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

/// Maps [`LabHubError`] to an HTTP response with appropriate status code.
///
/// Validation failures are answered with the bare field map,
/// `{"field": ["message", ...]}`.
#[derive(Debug)]
pub enum ApiError {
    Domain(LabHubError),
    /// The body is not JSON at all: wrong content type, syntax error, too large.
    Body(StatusCode, String),
}

impl From<LabHubError> for ApiError {
    fn from(err: LabHubError) -> Self {
        Self::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let detail = err.body_text();
                tracing::debug!(%detail, "request body does not match its schema");
                let field = rejected_field(&detail).unwrap_or("base");
                Self::Domain(ValidationError::single(field, messages::INVALID).into())
            }
            other => Self::Body(other.status(), other.body_text()),
        }
    }
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Domain(LabHubError::Unauthorized)
    }
}

/// Attribute named by a deserialization failure, without the root key.
///
/// `"...target type: sensor.pin: invalid type: ..."` names `pin`, and
/// `"job.data.progress.completion"` names `data.progress.completion`.
fn rejected_field(detail: &str) -> Option<&str> {
    let (_, rest) = detail.split_once("target type: ")?;
    let (path, _) = rest.split_once(": ")?;
    if path.is_empty() || path.contains(char::is_whitespace) {
        return None;
    }
    let field = path.split_once('.').map_or(path, |(_, field)| field);
    (!field.is_empty()).then_some(field)
}

fn error(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::Body(status, message) => return error(status, message),
            Self::Domain(err) => err,
        };
        match err {
            LabHubError::Validation(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(err)).into_response()
            }
            LabHubError::NotFound(err) => error(StatusCode::NOT_FOUND, err.to_string()),
            LabHubError::Unauthorized => {
                let mut response = error(
                    StatusCode::UNAUTHORIZED,
                    LabHubError::Unauthorized.to_string(),
                );
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    header::HeaderValue::from_static("Bearer"),
                );
                response
            }
            LabHubError::Forbidden(err) => error(StatusCode::FORBIDDEN, err.to_string()),
            LabHubError::QueueClosed => {
                tracing::error!("task queue is closed");
                error(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service unavailable".to_string(),
                )
            }
            LabHubError::Storage(err) => {
                tracing::error!(error = %err, source = ?err.source(), "storage error");
                error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            LabHubError::Upload(err) => {
                tracing::error!(error = %err, source = ?err.source(), "upload storage error");
                error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        }
    }
}
