use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::GeoPoint;

/// A computed road route. Replaceable whole: a new computation fully
/// supersedes the prior result, never patches it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub polyline: Vec<GeoPoint>,
    pub next_instruction: String,
    pub computed_at: DateTime<Utc>,
}

impl RouteResult {
    pub fn new(polyline: Vec<GeoPoint>, next_instruction: String) -> Self {
        Self {
            polyline,
            next_instruction,
            computed_at: Utc::now(),
        }
    }
}
