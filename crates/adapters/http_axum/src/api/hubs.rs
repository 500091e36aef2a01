//! JSON REST handlers for hubs.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use labhub_domain::id::HubId;

use super::{location, parse_id};
use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorBody, FieldErrors};
use crate::extract::JsonBody;
use crate::state::{AppState, Backend};
use crate::views::{self, HubRequest, HubView};

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<HubView>>),
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
    Ok(Json<HubView>),
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
    Created(Json<HubView>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => {
                let headers = location(format!("/api/v1/hubs/{}", json.0.id));
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

/// `GET /api/v1/hubs`
#[utoipa::path(
    get,
    path = "/api/v1/hubs",
    tag = "hubs",
    responses(
        (status = 200, description = "Hubs visible to the caller", body = [HubView]),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
) -> Result<ListResponse, ApiError> {
    let hubs = state.hub_service.list_hubs(&actor).await?;
    Ok(ListResponse::Ok(Json(views::all(hubs))))
}

/// `GET /api/v1/hubs/{id}`
#[utoipa::path(
    get,
    path = "/api/v1/hubs/{id}",
    tag = "hubs",
    params(("id" = uuid::Uuid, Path, description = "Hub id")),
    responses(
        (status = 200, description = "The hub", body = HubView),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Unknown hub", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError> {
    let id: HubId = parse_id("Hub", &id)?;
    let hub = state.hub_service.get_hub(&actor, id).await?;
    Ok(GetResponse::Ok(Json(hub.into())))
}

/// `POST /api/v1/hubs`
#[utoipa::path(
    post,
    path = "/api/v1/hubs",
    tag = "hubs",
    request_body = HubRequest,
    responses(
        (status = 201, description = "Hub created", body = HubView),
        (status = 422, description = "Field errors", body = FieldErrors),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    JsonBody(req): JsonBody<HubRequest>,
) -> Result<CreateResponse, ApiError> {
    let hub = state
        .hub_service
        .create_hub(&actor, req.into())
        .await?;
    Ok(CreateResponse::Created(Json(hub.into())))
}

/// `DELETE /api/v1/hubs/{id}`
#[utoipa::path(
    delete,
    path = "/api/v1/hubs/{id}",
    tag = "hubs",
    params(("id" = uuid::Uuid, Path, description = "Hub id")),
    responses(
        (status = 204, description = "Hub, its sensors and their readings removed"),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Unknown hub", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    let id: HubId = parse_id("Hub", &id)?;
    state.hub_service.delete_hub(&actor, id).await?;
    Ok(DeleteResponse::NoContent)
}
