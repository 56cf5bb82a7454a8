use serde::{Deserialize, Serialize};

use crate::entities::GeoPoint;

/// One active delivery: restaurant pickup, NGO drop-off. Owned by the
/// surrounding application and read-only here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub pickup_point: GeoPoint,
    pub dropoff_point: GeoPoint,
    pub pickup_label: String,
    pub dropoff_label: String,
}
