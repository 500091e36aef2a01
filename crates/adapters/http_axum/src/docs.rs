//! `OpenAPI` document of the REST API.

use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::{hubs, jobs, printers, sensors, users};
use crate::error::{ErrorBody, FieldErrors};
use crate::views;

/// `OpenAPI` 3 document for the `/api/v1` routes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "labhub API",
        description = "Manage 3D printers and their print jobs, sensor hubs and their sensor readings."
    ),
    paths(
        users::me,
        users::create,
        printers::list,
        printers::get,
        printers::create,
        printers::delete,
        jobs::list,
        jobs::create,
        jobs::get,
        jobs::update,
        jobs::delete,
        jobs::download_model,
        jobs::upload_model,
        jobs::alerts,
        hubs::list,
        hubs::get,
        hubs::create,
        hubs::delete,
        sensors::list,
        sensors::create,
        sensors::get,
        sensors::update,
        sensors::delete,
        sensors::list_data,
        sensors::add_data,
    ),
    components(
        schemas(
            ErrorBody,
            FieldErrors,
            views::UserView,
            views::CreatedUserView,
            views::PrinterView,
            views::JobView,
            views::AlertView,
            views::HubView,
            views::SensorView,
            views::DataPointView,
            views::UserRequest,
            views::UserBody,
            views::PrinterRequest,
            views::PrinterBody,
            views::JobRequest,
            views::JobBody,
            views::HubRequest,
            views::HubBody,
            views::SensorRequest,
            views::SensorBody,
            views::DataPointRequest,
            views::DataPointBody,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "users", description = "Accounts and API tokens"),
        (name = "printers", description = "3D printers"),
        (name = "jobs", description = "Print jobs, their model files and status alerts"),
        (name = "hubs", description = "Sensor hubs"),
        (name = "sensors", description = "Sensors and their readings"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by every secured path.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// `GET /api/v1/swagger.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
