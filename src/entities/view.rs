use serde::{Deserialize, Serialize};

use crate::entities::{BoundingBox, GeoPoint, Phase, RouteResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Overview,
    StreetLevel,
}

/// What the map surface should display: either fit a bounding box exactly,
/// or center on a point at a fixed zoom.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    Fit { bounds: BoundingBox },
    Center { point: GeoPoint, zoom: u8 },
}

/// The one contract handed to the rendering layer. Recomputed as a whole
/// on every applied event; consumers never observe a partial update.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewModel {
    pub position: GeoPoint,
    pub heading_degrees: f64,
    pub mode: ViewMode,
    pub viewport: Viewport,
    pub destination: GeoPoint,
    pub destination_label: String,
    pub route: Option<RouteResult>,
    pub phase: Phase,
    pub status_text: String,
    pub location_warning: Option<String>,
    pub routing_warning: Option<String>,
}
