//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use carbazar_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carbazar API",
        version = "0.1.0",
        description = "Car marketplace backend: serves the car inventory and fans out car-sale submissions to the configured notification channels (email, WhatsApp) with file attachments."
    ),
    paths(
        handlers::submissions::submit_car_sale,
        handlers::listings::list_listings,
        handlers::listings::get_listing,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::SubmissionForm,
            models::CarListing,
            models::ChannelKind,
            models::ChannelOutcome,
            models::DispatchStatus,
            handlers::submissions::SubmissionResponse,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "submissions", description = "Car-sale submission dispatch"),
        (name = "listings", description = "Car inventory"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
