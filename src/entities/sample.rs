use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::GeoPoint;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub point: GeoPoint,
    pub captured_at: DateTime<Utc>,
    pub accuracy_meters: Option<f64>,
}

impl PositionSample {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            captured_at: Utc::now(),
            accuracy_meters: None,
        }
    }
}
