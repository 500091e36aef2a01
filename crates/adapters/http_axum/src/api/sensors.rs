//! JSON REST handlers for sensors and their readings.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use utoipa::IntoParams;

use labhub_domain::data_point::DataWindow;
use labhub_domain::id::{HubId, SensorId};

use super::{location, parse_id};
use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorBody, FieldErrors};
use crate::extract::JsonBody;
use crate::state::{AppState, Backend};
use crate::views::{self, DataPointRequest, DataPointView, SensorRequest, SensorView};

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<SensorView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum SensorResponse {
    Ok(Json<SensorView>),
}

impl IntoResponse for SensorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<SensorView>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => {
                let headers = location(format!("/api/v1/sensors/{}", json.0.id));
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

/// Possible responses from the data listing endpoint.
pub enum DataResponse {
    Ok(Json<Vec<DataPointView>>),
}

impl IntoResponse for DataResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the data logging endpoint.
pub enum AddDataResponse {
    Created(Json<DataPointView>),
}

impl IntoResponse for AddDataResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// How far back to read; both parts add up, none means everything.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DataQuery {
    pub days_ago: Option<u32>,
    pub hours_ago: Option<u32>,
}

impl From<DataQuery> for DataWindow {
    fn from(query: DataQuery) -> Self {
        Self {
            days_ago: query.days_ago,
            hours_ago: query.hours_ago,
        }
    }
}

/// `GET /api/v1/hubs/{id}/sensors`
#[utoipa::path(
    get,
    path = "/api/v1/hubs/{id}/sensors",
    tag = "sensors",
    params(("id" = uuid::Uuid, Path, description = "Hub id")),
    responses(
        (status = 200, description = "Sensors of the hub", body = [SensorView]),
        (status = 403, description = "Hub belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown hub", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(hub_id): Path<String>,
) -> Result<ListResponse, ApiError> {
    let hub_id: HubId = parse_id("Hub", &hub_id)?;
    let sensors = state.sensor_service.list_sensors(&actor, hub_id).await?;
    Ok(ListResponse::Ok(Json(views::all(sensors))))
}

/// `POST /api/v1/hubs/{id}/sensors`
#[utoipa::path(
    post,
    path = "/api/v1/hubs/{id}/sensors",
    tag = "sensors",
    params(("id" = uuid::Uuid, Path, description = "Hub id")),
    request_body = SensorRequest,
    responses(
        (status = 201, description = "Sensor created", body = SensorView),
        (status = 403, description = "Hub belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown hub", body = ErrorBody),
        (status = 422, description = "Field errors", body = FieldErrors),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(hub_id): Path<String>,
    JsonBody(req): JsonBody<SensorRequest>,
) -> Result<CreateResponse, ApiError> {
    let hub_id: HubId = parse_id("Hub", &hub_id)?;
    let sensor = state
        .sensor_service
        .create_sensor(&actor, hub_id, req.into())
        .await?;
    Ok(CreateResponse::Created(Json(sensor.into())))
}

/// `GET /api/v1/sensors/{id}`
#[utoipa::path(
    get,
    path = "/api/v1/sensors/{id}",
    tag = "sensors",
    params(("id" = uuid::Uuid, Path, description = "Sensor id")),
    responses(
        (status = 200, description = "The sensor", body = SensorView),
        (status = 403, description = "Hub belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown sensor", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<SensorResponse, ApiError> {
    let id: SensorId = parse_id("Sensor", &id)?;
    let sensor = state.sensor_service.get_sensor(&actor, id).await?;
    Ok(SensorResponse::Ok(Json(sensor.into())))
}

/// `PATCH /api/v1/sensors/{id}`
#[utoipa::path(
    patch,
    path = "/api/v1/sensors/{id}",
    tag = "sensors",
    params(("id" = uuid::Uuid, Path, description = "Sensor id")),
    request_body = SensorRequest,
    responses(
        (status = 200, description = "Updated sensor", body = SensorView),
        (status = 403, description = "Hub belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown sensor", body = ErrorBody),
        (status = 422, description = "Field errors", body = FieldErrors),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<SensorRequest>,
) -> Result<SensorResponse, ApiError> {
    let id: SensorId = parse_id("Sensor", &id)?;
    let sensor = state
        .sensor_service
        .update_sensor(&actor, id, req.into())
        .await?;
    Ok(SensorResponse::Ok(Json(sensor.into())))
}

/// `DELETE /api/v1/sensors/{id}`
#[utoipa::path(
    delete,
    path = "/api/v1/sensors/{id}",
    tag = "sensors",
    params(("id" = uuid::Uuid, Path, description = "Sensor id")),
    responses(
        (status = 204, description = "Sensor and its readings removed"),
        (status = 403, description = "Hub belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown sensor", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    let id: SensorId = parse_id("Sensor", &id)?;
    state.sensor_service.delete_sensor(&actor, id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/v1/sensors/{id}/data?days_ago=1&hours_ago=6`
#[utoipa::path(
    get,
    path = "/api/v1/sensors/{id}/data",
    tag = "sensors",
    params(("id" = uuid::Uuid, Path, description = "Sensor id"), DataQuery),
    responses(
        (status = 200, description = "Readings inside the window, oldest first", body = [DataPointView]),
        (status = 403, description = "Hub belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown sensor", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_data<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<DataQuery>,
) -> Result<DataResponse, ApiError> {
    let id: SensorId = parse_id("Sensor", &id)?;
    let points = state
        .sensor_service
        .list_data(&actor, id, query.into())
        .await?;
    Ok(DataResponse::Ok(Json(views::all(points))))
}

/// `POST /api/v1/sensors/{id}/data`
#[utoipa::path(
    post,
    path = "/api/v1/sensors/{id}/data",
    tag = "sensors",
    params(("id" = uuid::Uuid, Path, description = "Sensor id")),
    request_body = DataPointRequest,
    responses(
        (status = 201, description = "Reading recorded", body = DataPointView),
        (status = 403, description = "Hub belongs to someone else", body = ErrorBody),
        (status = 404, description = "Unknown sensor", body = ErrorBody),
        (status = 422, description = "Field errors", body = FieldErrors),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_data<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<DataPointRequest>,
) -> Result<AddDataResponse, ApiError> {
    let id: SensorId = parse_id("Sensor", &id)?;
    let point = state
        .sensor_service
        .add_data(&actor, id, req.into())
        .await?;
    Ok(AddDataResponse::Created(Json(point.into())))
}
