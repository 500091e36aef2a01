//! JSON REST handlers for user accounts.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorBody, FieldErrors};
use crate::extract::JsonBody;
use crate::state::{AppState, Backend};
use crate::views::{CreatedUserView, UserRequest, UserView};

/// Possible responses from the `me` endpoint.
pub enum MeResponse {
    Ok(Json<UserView>),
}

impl IntoResponse for MeResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<CreatedUserView>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/v1/users/me`
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The authenticated user", body = UserView),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
) -> Result<MeResponse, ApiError> {
    let user = state.user_service.current(&actor)?;
    Ok(MeResponse::Ok(Json(user.into())))
}

/// `POST /api/v1/users`
///
/// The token in the response is the only copy ever handed out.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "Account created", body = CreatedUserView),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 422, description = "Field errors", body = FieldErrors),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create<B: Backend>(
    State(state): State<AppState<B>>,
    CurrentUser(actor): CurrentUser,
    JsonBody(req): JsonBody<UserRequest>,
) -> Result<CreateResponse, ApiError> {
    let created = state.user_service.create_user(&actor, req.into()).await?;
    Ok(CreateResponse::Created(Json(created.into())))
}
