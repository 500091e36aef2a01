//! JSON REST handlers for print jobs, their model files and alerts.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use utoipa::IntoParams;

use labhub_domain::id::{JobId, PrinterId};

use super::{location, parse_id};
use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorBody, FieldErrors};
use crate::extract::JsonBody;
use crate::state::{AppState, Backend};
use crate::views::{self, AlertView, JobRequest, JobView};

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<JobView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get, update and upload endpoints.
pub enum JobResponse {
    Ok(Json<JobView>),
}

impl IntoResponse for JobResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<JobView>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => {
                let headers = location(format!("/api/v1/jobs/{}", json.0.id));
                (StatusCode::CREATED, headers, json).into_response()
            }
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the model download endpoint.
pub enum ModelResponse {
    File { file_name: String, bytes: Vec<u8> },
}

impl IntoResponse for ModelResponse {
    fn into_response(self) -> Response {
        match self {
            Self::File { file_name, bytes } => {
                let disposition = HeaderValue::from_str(&format!(
                    "attachment; filename=\"{}\"",
                    header_safe(&file_name)
                ))
                .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
                (
                    [
                        (
                            header::CONTENT_TYPE,
                            HeaderValue::from_static("application/octet-stream"),
                        ),
                        (header::CONTENT_DISPOSITION, disposition),
                    ],
                    bytes,
                )
                    .into_response()
            }
        }
    }
}

/// Possible responses from the alerts endpoint.
pub enum AlertsResponse {
    Ok(Json<Vec<AlertView>>),
}

impl IntoResponse for AlertsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Query of the model upload endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModelUpload {
    /// Original name of the uploaded file.
    pub file_name: Option<String>,
}

/// Keep a file name usable inside a quoted header parameter.
fn header_safe(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && !matches!(c, '"' | '\\')) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `GET /api/v1/printers/{id}/jobs`
#[utoipa::path(
    get,
    path = "/api/v1/printers/{id}/jobs",
    tag = "jobs",
    params(("id" = uuid::Uuid, Path, description = "Printer id")),
    responses(
        (status = 200, description = "Jobs of the printer, newest first", body = [JobView]),
        (status = 403, description = "Printer belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown printer", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(printer_id): Path<String>,
) -> Result<ListResponse, ApiError> {
    let printer_id: PrinterId = parse_id("Printer", &printer_id)?;
    let jobs = state.job_service.list_jobs(&actor, printer_id).await?;
    Ok(ListResponse::Ok(Json(views::all(jobs))))
}

/// `POST /api/v1/printers/{id}/jobs`
#[utoipa::path(
    post,
    path = "/api/v1/printers/{id}/jobs",
    tag = "jobs",
    params(("id" = uuid::Uuid, Path, description = "Printer id")),
    request_body = JobRequest,
    responses(
        (status = 201, description = "Job created", body = JobView),
        (status = 403, description = "Printer belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown printer", body = ErrorBody),
        (status = 422, description = "Field errors", body = FieldErrors),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(printer_id): Path<String>,
    JsonBody(req): JsonBody<JobRequest>,
) -> Result<CreateResponse, ApiError> {
    let printer_id: PrinterId = parse_id("Printer", &printer_id)?;
    let job = state
        .job_service
        .create_job(&actor, printer_id, req.into())
        .await?;
    Ok(CreateResponse::Created(Json(job.into())))
}

/// `GET /api/v1/jobs/{id}`
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(("id" = uuid::Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "The job", body = JobView),
        (status = 403, description = "Printer belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown job", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<JobResponse, ApiError> {
    let id: JobId = parse_id("Job", &id)?;
    let job = state.job_service.get_job(&actor, id).await?;
    Ok(JobResponse::Ok(Json(job.into())))
}

/// `PATCH /api/v1/jobs/{id}`
///
/// A supplied `data` document replaces the stored one.
#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(("id" = uuid::Uuid, Path, description = "Job id")),
    request_body = JobRequest,
    responses(
        (status = 200, description = "Updated job", body = JobView),
        (status = 403, description = "Printer belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown job", body = ErrorBody),
        (status = 422, description = "Field errors", body = FieldErrors),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<JobRequest>,
) -> Result<JobResponse, ApiError> {
    let id: JobId = parse_id("Job", &id)?;
    let job = state.job_service.update_job(&actor, id, req.into()).await?;
    Ok(JobResponse::Ok(Json(job.into())))
}

/// `DELETE /api/v1/jobs/{id}`
///
/// Requests a cancellation; the job record stays in place.
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(("id" = uuid::Uuid, Path, description = "Job id")),
    responses(
        (status = 204, description = "Cancellation requested"),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 404, description = "Unknown job", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    let id: JobId = parse_id("Job", &id)?;
    state.job_service.cancel_job(&actor, id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/v1/jobs/{id}/model`
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/model",
    tag = "jobs",
    params(("id" = uuid::Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Model file", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 403, description = "Printer belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown job or no model uploaded", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_model<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<ModelResponse, ApiError> {
    let id: JobId = parse_id("Job", &id)?;
    let (file_name, bytes) = state.job_service.fetch_model(&actor, id).await?;
    Ok(ModelResponse::File { file_name, bytes })
}

/// `PUT /api/v1/jobs/{id}/model?file_name=part.stl`
///
/// The request body is the raw file content.
#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/model",
    tag = "jobs",
    params(("id" = uuid::Uuid, Path, description = "Job id"), ModelUpload),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Job with its new model", body = JobView),
        (status = 403, description = "Printer belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown job", body = ErrorBody),
        (status = 413, description = "File too large"),
        (status = 422, description = "Field errors", body = FieldErrors),
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_model<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    Query(upload): Query<ModelUpload>,
    body: Bytes,
) -> Result<JobResponse, ApiError> {
    let id: JobId = parse_id("Job", &id)?;
    let file_name = upload.file_name.unwrap_or_default();
    let job = state
        .job_service
        .attach_model(&actor, id, &file_name, body.to_vec())
        .await?;
    Ok(JobResponse::Ok(Json(job.into())))
}

/// `GET /api/v1/jobs/{id}/alerts`
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/alerts",
    tag = "jobs",
    params(("id" = uuid::Uuid, Path, description = "Job id")),
    responses(
        (status = 200, description = "Status alerts, newest first", body = [AlertView]),
        (status = 403, description = "Printer belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown job", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn alerts<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<AlertsResponse, ApiError> {
    let id: JobId = parse_id("Job", &id)?;
    let alerts = state.job_service.list_alerts(&actor, id).await?;
    Ok(AlertsResponse::Ok(Json(views::all(alerts))))
}
