//! Car listing read endpoints.

use axum::extract::{Path, State};
use axum::Json;
use carbazar_core::models::CarListing;
use carbazar_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::DbState;

/// List every car currently in the inventory, newest first.
#[utoipa::path(
    get,
    path = "/listings",
    tag = "listings",
    responses(
        (status = 200, description = "All car listings", body = [CarListing]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(db), fields(operation = "list_listings"))]
pub async fn list_listings(
    State(db): State<DbState>,
) -> Result<Json<Vec<CarListing>>, HttpAppError> {
    let listings = db.listings.list_all().await.map_err(HttpAppError)?;
    Ok(Json(listings))
}

/// Fetch one car listing by id.
#[utoipa::path(
    get,
    path = "/listings/{id}",
    tag = "listings",
    params(
        ("id" = i64, Path, description = "Listing id")
    ),
    responses(
        (status = 200, description = "The car listing", body = CarListing),
        (status = 404, description = "Listing not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(db), fields(operation = "get_listing"))]
pub async fn get_listing(
    State(db): State<DbState>,
    Path(id): Path<i64>,
) -> Result<Json<CarListing>, HttpAppError> {
    let listing = db
        .listings
        .get(id)
        .await
        .map_err(HttpAppError)?
        .ok_or_else(|| HttpAppError(AppError::NotFound(format!("Listing {} not found", id))))?;
    Ok(Json(listing))
}
