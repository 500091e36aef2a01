//! JSON REST handlers for printers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use labhub_domain::id::PrinterId;

use super::{location, parse_id};
use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorBody, FieldErrors};
use crate::extract::JsonBody;
use crate::state::{AppState, Backend};
use crate::views::{self, PrinterRequest, PrinterView};

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<PrinterView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<PrinterView>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<PrinterView>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => {
                let headers = location(format!("/api/v1/printers/{}", json.0.id));
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

/// `GET /api/v1/printers`
#[utoipa::path(
    get,
    path = "/api/v1/printers",
    tag = "printers",
    responses(
        (status = 200, description = "Printers visible to the caller", body = [PrinterView]),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
) -> Result<ListResponse, ApiError> {
    let printers = state.printer_service.list_printers(&actor).await?;
    Ok(ListResponse::Ok(Json(views::all(printers))))
}

/// `GET /api/v1/printers/{id}`
#[utoipa::path(
    get,
    path = "/api/v1/printers/{id}",
    tag = "printers",
    params(("id" = uuid::Uuid, Path, description = "Printer id")),
    responses(
        (status = 200, description = "The printer", body = PrinterView),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Unknown printer", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError> {
    let id: PrinterId = parse_id("Printer", &id)?;
    let printer = state.printer_service.get_printer(&actor, id).await?;
    Ok(GetResponse::Ok(Json(printer.into())))
}

/// `POST /api/v1/printers`
#[utoipa::path(
    post,
    path = "/api/v1/printers",
    tag = "printers",
    request_body = PrinterRequest,
    responses(
        (status = 201, description = "Printer created", body = PrinterView),
        (status = 422, description = "Field errors", body = FieldErrors),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    JsonBody(req): JsonBody<PrinterRequest>,
) -> Result<CreateResponse, ApiError> {
    let printer = state
        .printer_service
        .create_printer(&actor, req.into())
        .await?;
    Ok(CreateResponse::Created(Json(printer.into())))
}

/// `DELETE /api/v1/printers/{id}`
#[utoipa::path(
    delete,
    path = "/api/v1/printers/{id}",
    tag = "printers",
    params(("id" = uuid::Uuid, Path, description = "Printer id")),
    responses(
        (status = 204, description = "Printer and its jobs removed"),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Unknown printer", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    let id: PrinterId = parse_id("Printer", &id)?;
    state.printer_service.delete_printer(&actor, id).await?;
    Ok(DeleteResponse::NoContent)
}
