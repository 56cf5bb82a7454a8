use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;

use crate::{
    api::RoutingProvider,
    entities::{GeoPoint, RouteResult},
    error::{invalid_input_error, upstream_error, Error},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response {
    code: String,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Route {
    geometry: Geometry,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Geometry {
    // GeoJSON order: [longitude, latitude]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Leg {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Step {
    maneuver: Maneuver,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Maneuver {
    #[serde(default)]
    instruction: String,
}

/// OSRM-compatible routing provider (`/route/v1` API).
#[derive(Clone, Debug)]
pub struct OsrmRouter {
    base_url: String,
    client: reqwest::Client,
}

impl OsrmRouter {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, Error> {
        let base_url = env::var("ROUTING_API_BASE")?;
        Ok(Self::new(base_url))
    }
}

#[async_trait]
impl RoutingProvider for OsrmRouter {
    #[tracing::instrument(skip(self))]
    async fn fetch_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteResult, Error> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude,
        );

        let res = self
            .client
            .get(url)
            .query(&[("overview", "full")])
            .query(&[("geometries", "geojson")])
            .query(&[("steps", "true")])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if status_code >= 400 && status_code < 500 {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        let data: Response = res.json().await?;

        into_route_result(data)
    }
}

fn into_route_result(data: Response) -> Result<RouteResult, Error> {
    if data.code != "Ok" {
        return Err(upstream_error());
    }

    let route = data
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| upstream_error())?;

    let polyline = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[longitude, latitude]| GeoPoint::new(latitude, longitude))
        .collect();

    let next_instruction = route
        .legs
        .first()
        .and_then(|leg| leg.steps.first())
        .map(|step| step.maneuver.instruction.clone())
        .unwrap_or_default();

    Ok(RouteResult::new(polyline, next_instruction))
}
