//! Car listing repository: read-only access to the car_listings table.

use carbazar_core::models::CarListing;
use carbazar_core::AppError;
use sqlx::{PgPool, Postgres};

/// Repository for car_listings. Read-only: listings are created and
/// updated out of band.
#[derive(Clone)]
pub struct CarListingRepository {
    pool: PgPool,
}

impl CarListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch every listing, newest first. No pagination; the inventory is
    /// small and the frontend renders it in full.
    #[tracing::instrument(skip(self), fields(db.table = "car_listings"))]
    pub async fn list_all(&self) -> Result<Vec<CarListing>, AppError> {
        let listings: Vec<CarListing> = sqlx::query_as::<Postgres, CarListing>(
            r#"
            SELECT id, title, price, fuel_type, car_type, engine_type, mileage,
                   transmission, color, owners, year, registration, status,
                   image_url, description, created_at
            FROM car_listings
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    /// Fetch one listing by id.
    #[tracing::instrument(skip(self), fields(db.table = "car_listings"))]
    pub async fn get(&self, id: i64) -> Result<Option<CarListing>, AppError> {
        let listing: Option<CarListing> = sqlx::query_as::<Postgres, CarListing>(
            r#"
            SELECT id, title, price, fuel_type, car_type, engine_type, mileage,
                   transmission, color, owners, year, registration, status,
                   image_url, description, created_at
            FROM car_listings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(listing)
    }
}
