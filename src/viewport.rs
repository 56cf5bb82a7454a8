use crate::entities::{BoundingBox, GeoPoint, ViewMode, Viewport};

#[derive(Clone, Debug)]
pub struct ViewConfig {
    pub padding_degrees: f64,
    pub overview_zoom: u8,
    pub street_zoom: u8,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            padding_degrees: 0.01,
            overview_zoom: 13,
            street_zoom: 18,
        }
    }
}

/// Decides what region the map surface should display. Mode switches are
/// caller-driven and touch nothing but the mode itself.
#[derive(Clone, Debug)]
pub struct ViewportController {
    mode: ViewMode,
    config: ViewConfig,
}

impl ViewportController {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            mode: ViewMode::Overview,
            config,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn toggle(&mut self) -> ViewMode {
        self.mode = match self.mode {
            ViewMode::Overview => ViewMode::StreetLevel,
            ViewMode::StreetLevel => ViewMode::Overview,
        };

        self.mode
    }

    /// Overview fits the padded bounding box of all relevant points; with
    /// fewer than two distinct points it falls back to a default-zoom
    /// center. Street level centers tightly on the current position.
    pub fn viewport(&self, position: GeoPoint, relevant: &[GeoPoint]) -> Viewport {
        match self.mode {
            ViewMode::StreetLevel => Viewport::Center {
                point: position,
                zoom: self.config.street_zoom,
            },
            ViewMode::Overview => {
                let mut distinct: Vec<GeoPoint> = Vec::with_capacity(relevant.len());
                for point in relevant {
                    if !distinct.contains(point) {
                        distinct.push(*point);
                    }
                }

                if distinct.len() < 2 {
                    let point = distinct.first().copied().unwrap_or(position);
                    return Viewport::Center {
                        point,
                        zoom: self.config.overview_zoom,
                    };
                }

                match BoundingBox::from_points(&distinct) {
                    Some(bounds) => Viewport::Fit {
                        bounds: bounds.padded(self.config.padding_degrees),
                    },
                    None => Viewport::Center {
                        point: position,
                        zoom: self.config.overview_zoom,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_fits_all_points_with_padding() {
        let controller = ViewportController::new(ViewConfig::default());

        let points = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];

        match controller.viewport(points[0], &points) {
            Viewport::Fit { bounds } => {
                for point in &points {
                    assert!(bounds.contains(point));
                }
                assert_eq!(bounds.south_west, GeoPoint::new(-0.01, -0.01));
                assert_eq!(bounds.north_east, GeoPoint::new(1.01, 1.01));
            }
            other => panic!("expected fit, got {:?}", other),
        }
    }

    #[test]
    fn overview_of_a_single_point_centers_without_error() {
        let controller = ViewportController::new(ViewConfig::default());
        let point = GeoPoint::new(12.9716, 77.5946);

        match controller.viewport(point, &[point, point, point]) {
            Viewport::Center {
                point: center,
                zoom,
            } => {
                assert_eq!(center, point);
                assert_eq!(zoom, 13);
            }
            other => panic!("expected center, got {:?}", other),
        }
    }

    #[test]
    fn street_level_centers_on_current_position() {
        let mut controller = ViewportController::new(ViewConfig::default());
        assert_eq!(controller.toggle(), ViewMode::StreetLevel);

        let position = GeoPoint::new(12.97, 77.59);
        let elsewhere = GeoPoint::new(12.98, 77.60);

        match controller.viewport(position, &[position, elsewhere]) {
            Viewport::Center { point, zoom } => {
                assert_eq!(point, position);
                assert_eq!(zoom, 18);
            }
            other => panic!("expected center, got {:?}", other),
        }
    }

    #[test]
    fn toggle_round_trips() {
        let mut controller = ViewportController::new(ViewConfig::default());

        assert_eq!(controller.mode(), ViewMode::Overview);
        assert_eq!(controller.toggle(), ViewMode::StreetLevel);
        assert_eq!(controller.toggle(), ViewMode::Overview);
    }
}
