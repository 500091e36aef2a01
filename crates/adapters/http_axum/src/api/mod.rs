//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod hubs;
#[allow(clippy::missing_errors_doc)]
pub mod jobs;
#[allow(clippy::missing_errors_doc)]
pub mod printers;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;
#[allow(clippy::missing_errors_doc)]
pub mod users;

use std::str::FromStr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post};

use labhub_domain::error::{LabHubError, NotFoundError};

use crate::error::ApiError;
use crate::state::{AppState, Backend};

/// Largest accepted model upload.
pub const MAX_MODEL_BYTES: usize = 64 * 1024 * 1024;

/// Build the `/api/v1` sub-router.
pub fn routes<B: Backend>() -> Router<AppState<B>> {
    Router::new()
        .route("/swagger.json", get(crate::docs::openapi_json))
        // Users
        .route("/users", post(users::create::<B>))
        .route("/users/me", get(users::me::<B>))
        // Printers and their jobs
        .route(
            "/printers",
            get(printers::list::<B>).post(printers::create::<B>),
        )
        .route(
            "/printers/{id}",
            get(printers::get::<B>).delete(printers::delete::<B>),
        )
        .route(
            "/printers/{id}/jobs",
            get(jobs::list::<B>).post(jobs::create::<B>),
        )
        // Jobs
        .route(
            "/jobs/{id}",
            get(jobs::get::<B>)
                .patch(jobs::update::<B>)
                .put(jobs::update::<B>)
                .delete(jobs::delete::<B>),
        )
        .route(
            "/jobs/{id}/model",
            get(jobs::download_model::<B>)
                .put(jobs::upload_model::<B>)
                .layer(DefaultBodyLimit::max(MAX_MODEL_BYTES)),
        )
        .route("/jobs/{id}/alerts", get(jobs::alerts::<B>))
        // Hubs and their sensors
        .route("/hubs", get(hubs::list::<B>).post(hubs::create::<B>))
        .route(
            "/hubs/{id}",
            get(hubs::get::<B>).delete(hubs::delete::<B>),
        )
        .route(
            "/hubs/{id}/sensors",
            get(sensors::list::<B>).post(sensors::create::<B>),
        )
        // Sensors
        .route(
            "/sensors/{id}",
            get(sensors::get::<B>)
                .patch(sensors::update::<B>)
                .put(sensors::update::<B>)
                .delete(sensors::delete::<B>),
        )
        .route(
            "/sensors/{id}/data",
            get(sensors::list_data::<B>).post(sensors::add_data::<B>),
        )
}

/// Parse a path id. Anything unparsable cannot name a record, so it is
/// reported as missing rather than malformed.
pub(crate) fn parse_id<T: FromStr>(entity: &'static str, raw: &str) -> Result<T, ApiError> {
    T::from_str(raw).map_err(|_| {
        ApiError::from(LabHubError::from(NotFoundError {
            entity,
            id: raw.to_string(),
        }))
    })
}

/// `Location` header value for a freshly created resource.
pub(crate) fn location(path: String) -> [(header::HeaderName, HeaderValue); 1] {
    let value = HeaderValue::from_str(&path).unwrap_or_else(|_| HeaderValue::from_static("/"));
    [(header::LOCATION, value)]
}
