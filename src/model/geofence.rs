use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Circular admission zone owned by one admin. A worker standing inside
/// any zone of their tenant admin may clock in.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Geofence {
    pub id: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters.
    pub radius: f64,
    pub admin_id: u64,
}
