use serde::{Deserialize, Serialize};

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle forward azimuth from `self` toward `other`, in degrees
    /// normalized to `[0, 360)`.
    pub fn initial_bearing_to(&self, other: &GeoPoint) -> f64 {
        let from_lat = self.latitude.to_radians();
        let to_lat = other.latitude.to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let y = d_lng.sin() * to_lat.cos();
        let x = from_lat.cos() * to_lat.sin() - from_lat.sin() * to_lat.cos() * d_lng.cos();

        (y.atan2(x).to_degrees() + 360.0) % 360.0
    }

    /// Haversine distance to `other` in meters.
    pub fn haversine_meters_to(&self, other: &GeoPoint) -> f64 {
        let from_lat = self.latitude.to_radians();
        let to_lat = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + from_lat.cos() * to_lat.cos() * (d_lng / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl BoundingBox {
    /// Minimal axis-aligned box covering `points`. Returns `None` for an
    /// empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;

        let mut south = first.latitude;
        let mut north = first.latitude;
        let mut west = first.longitude;
        let mut east = first.longitude;

        for point in iter {
            south = south.min(point.latitude);
            north = north.max(point.latitude);
            west = west.min(point.longitude);
            east = east.max(point.longitude);
        }

        Some(Self {
            south_west: GeoPoint::new(south, west),
            north_east: GeoPoint::new(north, east),
        })
    }

    pub fn padded(&self, margin_degrees: f64) -> Self {
        Self {
            south_west: GeoPoint::new(
                self.south_west.latitude - margin_degrees,
                self.south_west.longitude - margin_degrees,
            ),
            north_east: GeoPoint::new(
                self.north_east.latitude + margin_degrees,
                self.north_east.longitude + margin_degrees,
            ),
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.south_west.latitude
            && point.latitude <= self.north_east.latitude
            && point.longitude >= self.south_west.longitude
            && point.longitude <= self.north_east.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_due_north() {
        let origin = GeoPoint::new(0.0, 0.0);
        let north = GeoPoint::new(1.0, 0.0);

        assert!((origin.initial_bearing_to(&north) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_due_east() {
        let origin = GeoPoint::new(0.0, 0.0);
        let east = GeoPoint::new(0.0, 1.0);

        assert!((origin.initial_bearing_to(&east) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_always_in_range() {
        let points = [
            GeoPoint::new(12.9716, 77.5946),
            GeoPoint::new(12.98, 77.60),
            GeoPoint::new(-33.86, 151.21),
            GeoPoint::new(51.5, -0.12),
            GeoPoint::new(0.0, 0.0),
        ];

        for from in &points {
            for to in &points {
                if from == to {
                    continue;
                }

                let bearing = from.initial_bearing_to(to);
                assert!((0.0..360.0).contains(&bearing), "bearing {}", bearing);
            }
        }
    }

    #[test]
    fn haversine_one_degree_latitude() {
        let origin = GeoPoint::new(0.0, 0.0);
        let north = GeoPoint::new(1.0, 0.0);

        let meters = origin.haversine_meters_to(&north);
        assert!((meters - 111_195.0).abs() < 100.0, "meters {}", meters);
    }

    #[test]
    fn bounding_box_covers_points_with_padding() {
        let points = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];

        let bounds = BoundingBox::from_points(&points).unwrap().padded(0.01);

        for point in &points {
            assert!(bounds.contains(point));
        }

        assert_eq!(bounds.south_west, GeoPoint::new(-0.01, -0.01));
        assert_eq!(bounds.north_east, GeoPoint::new(1.01, 1.01));
    }

    #[test]
    fn bounding_box_of_nothing() {
        assert!(BoundingBox::from_points(&[]).is_none());
    }
}
