use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{GeoPoint, PositionSample, RouteResult};
use crate::error::Error;

/// Coarse classification of a device geolocation failure. These are
/// user-facing warning conditions, not fatal errors; tracking continues on
/// the last known (or default) position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocationErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl LocationErrorKind {
    pub fn warning_text(&self) -> String {
        match self {
            Self::PermissionDenied => {
                "Location access denied. Please enable location services.".into()
            }
            Self::PositionUnavailable => "Location unavailable. Please try again.".into(),
            Self::Timeout => "Unable to get your location. Using default location.".into(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum PositionEvent {
    Fix(PositionSample),
    Failed(LocationErrorKind),
}

pub type PositionUpdates = async_channel::Receiver<PositionEvent>;

/// The device geolocation stream. Implementations request high accuracy
/// and never replay a cached fix. `subscribe` fails only when the device
/// has no geolocation capability at all; stream-level failures arrive as
/// `PositionEvent::Failed` on the channel.
#[async_trait]
pub trait PositionSource {
    async fn subscribe(&self) -> Result<PositionUpdates, Error>;
}

/// The road-routing provider, reachable over HTTP in production.
#[async_trait]
pub trait RoutingProvider {
    async fn fetch_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteResult, Error>;
}

pub type DynPositionSource = Arc<dyn PositionSource + Send + Sync>;
pub type DynRouter = Arc<dyn RoutingProvider + Send + Sync>;
