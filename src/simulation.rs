use std::time::Duration;

use async_trait::async_trait;
use rand_distr::{Distribution, Normal};

use crate::api::{PositionEvent, PositionSource, PositionUpdates, RoutingProvider};
use crate::entities::{GeoPoint, PositionSample, RouteResult};
use crate::error::{unexpected_error, Error};

/// Replays a scripted path as a position stream, with normally distributed
/// measurement noise on each fix.
pub struct SimulatedPositions {
    path: Vec<GeoPoint>,
    interval: Duration,
    jitter_std_degrees: f64,
}

impl SimulatedPositions {
    pub fn new(path: Vec<GeoPoint>, interval: Duration, jitter_std_degrees: f64) -> Self {
        Self {
            path,
            interval,
            jitter_std_degrees,
        }
    }
}

#[async_trait]
impl PositionSource for SimulatedPositions {
    #[tracing::instrument(skip(self))]
    async fn subscribe(&self) -> Result<PositionUpdates, Error> {
        let (tx, rx) = async_channel::unbounded();

        let path = self.path.clone();
        let interval = self.interval;
        let jitter = Normal::new(0.0, self.jitter_std_degrees).map_err(|_| unexpected_error())?;

        tokio::spawn(async move {
            for point in path {
                let fix = {
                    let mut rng = rand::thread_rng();

                    GeoPoint::new(
                        point.latitude + jitter.sample(&mut rng),
                        point.longitude + jitter.sample(&mut rng),
                    )
                };

                if tx
                    .send(PositionEvent::Fix(PositionSample::new(fix)))
                    .await
                    .is_err()
                {
                    return;
                }

                tokio::time::sleep(interval).await;
            }
        });

        Ok(rx)
    }
}

/// Interpolates a straight polyline between origin and destination and
/// phrases the first instruction from the compass direction. Stands in for
/// the road-routing provider in demos and tests.
pub struct StraightLineRouter {
    segments: usize,
}

impl StraightLineRouter {
    pub fn new(segments: usize) -> Self {
        Self {
            segments: segments.max(1),
        }
    }
}

#[async_trait]
impl RoutingProvider for StraightLineRouter {
    async fn fetch_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteResult, Error> {
        let mut polyline = Vec::with_capacity(self.segments + 1);

        for step in 0..=self.segments {
            let fraction = step as f64 / self.segments as f64;

            polyline.push(GeoPoint::new(
                origin.latitude + (destination.latitude - origin.latitude) * fraction,
                origin.longitude + (destination.longitude - origin.longitude) * fraction,
            ));
        }

        let instruction = format!("Head {}", cardinal(origin.initial_bearing_to(&destination)));

        Ok(RouteResult::new(polyline, instruction))
    }
}

fn cardinal(bearing: f64) -> &'static str {
    match ((bearing + 22.5) % 360.0 / 45.0) as usize {
        0 => "north",
        1 => "northeast",
        2 => "east",
        3 => "southeast",
        4 => "south",
        5 => "southwest",
        6 => "west",
        _ => "northwest",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use tokio_test::block_on;

    #[test]
    fn simulated_stream_replays_the_path() {
        block_on(async {
            let path = vec![
                GeoPoint::new(12.97, 77.59),
                GeoPoint::new(12.975, 77.595),
                GeoPoint::new(12.98, 77.60),
            ];

            let source: Arc<dyn PositionSource + Send + Sync> = Arc::new(
                SimulatedPositions::new(path.clone(), Duration::from_millis(1), 0.0),
            );

            let updates = source.subscribe().await.unwrap();

            for expected in &path {
                match updates.recv().await.unwrap() {
                    PositionEvent::Fix(sample) => assert_eq!(sample.point, *expected),
                    other => panic!("unexpected event: {:?}", other),
                }
            }
        });
    }

    #[test]
    fn straight_line_route_spans_origin_to_destination() {
        block_on(async {
            let router = StraightLineRouter::new(4);

            let origin = GeoPoint::new(0.0, 0.0);
            let destination = GeoPoint::new(1.0, 0.0);

            let route = router.fetch_route(origin, destination).await.unwrap();

            assert_eq!(route.polyline.len(), 5);
            assert_eq!(route.polyline[0], origin);
            assert_eq!(*route.polyline.last().unwrap(), destination);
            assert_eq!(route.next_instruction, "Head north");
        });
    }

    #[test]
    fn cardinal_sectors() {
        assert_eq!(cardinal(0.0), "north");
        assert_eq!(cardinal(90.0), "east");
        assert_eq!(cardinal(180.0), "south");
        assert_eq!(cardinal(270.0), "west");
        assert_eq!(cardinal(359.0), "north");
    }
}
