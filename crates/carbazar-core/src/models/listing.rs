//! Persisted car listing (read path only).
//!
//! Listings are created and updated out of band; this service only reads
//! them. The field set mirrors the stored schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CarListing {
    pub id: i64,
    pub title: Option<String>,
    pub price: Option<f64>,
    pub fuel_type: Option<String>,
    pub car_type: Option<String>,
    pub engine_type: Option<String>,
    pub mileage: Option<f64>,
    pub transmission: Option<String>,
    pub color: Option<String>,
    pub owners: Option<i32>,
    pub year: Option<i32>,
    pub registration: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
