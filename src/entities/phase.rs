use serde::{Deserialize, Serialize};

use crate::entities::{GeoPoint, Order};
use crate::error::{invalid_state_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    EnRouteToPickup,
    EnRouteToDropoff,
    Completed,
}

impl Phase {
    pub fn name(&self) -> String {
        match self {
            Self::EnRouteToPickup => "en_route_to_pickup".into(),
            Self::EnRouteToDropoff => "en_route_to_dropoff".into(),
            Self::Completed => "completed".into(),
        }
    }
}

/// Three-phase order lifecycle. The phase enum is the only state; the
/// destination, label and status text are pure functions of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Delivery {
    phase: Phase,
}

impl Delivery {
    pub fn new() -> Self {
        Self {
            phase: Phase::EnRouteToPickup,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The only mutating operation. `EnRouteToPickup` advances on the
    /// "picked up" signal, `EnRouteToDropoff` on "delivered"; advancing a
    /// completed delivery is a loud error so callers cannot double-advance.
    #[tracing::instrument]
    pub fn advance(&mut self) -> Result<Phase, Error> {
        match self.phase {
            Phase::EnRouteToPickup => {
                self.phase = Phase::EnRouteToDropoff;
                Ok(self.phase)
            }
            Phase::EnRouteToDropoff => {
                self.phase = Phase::Completed;
                Ok(self.phase)
            }
            Phase::Completed => Err(invalid_state_error()),
        }
    }

    pub fn active_destination(&self, order: &Order) -> GeoPoint {
        match self.phase {
            Phase::EnRouteToPickup => order.pickup_point,
            _ => order.dropoff_point,
        }
    }

    pub fn destination_label<'a>(&self, order: &'a Order) -> &'a str {
        match self.phase {
            Phase::EnRouteToPickup => &order.pickup_label,
            _ => &order.dropoff_label,
        }
    }

    pub fn status_text(&self) -> String {
        match self.phase {
            Phase::EnRouteToPickup => "Heading to Restaurant".into(),
            Phase::EnRouteToDropoff => "Delivering to NGO".into(),
            Phase::Completed => "Delivery complete".into(),
        }
    }
}

impl Default for Delivery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order {
            id: "order-1".into(),
            pickup_point: GeoPoint::new(12.97, 77.59),
            dropoff_point: GeoPoint::new(12.98, 77.60),
            pickup_label: "Green Leaf Kitchen".into(),
            dropoff_label: "Hope Shelter".into(),
        }
    }

    #[test]
    fn advances_through_both_legs() {
        let mut delivery = Delivery::new();

        assert_eq!(delivery.phase(), Phase::EnRouteToPickup);
        assert_eq!(delivery.advance().unwrap(), Phase::EnRouteToDropoff);
        assert_eq!(delivery.advance().unwrap(), Phase::Completed);
    }

    #[test]
    fn advancing_a_completed_delivery_fails() {
        let mut delivery = Delivery::new();

        delivery.advance().unwrap();
        delivery.advance().unwrap();

        let err = delivery.advance().unwrap_err();
        assert_eq!(err.code, 100);
        assert_eq!(delivery.phase(), Phase::Completed);
    }

    #[test]
    fn destination_follows_phase() {
        let order = order();
        let mut delivery = Delivery::new();

        assert_eq!(delivery.active_destination(&order), order.pickup_point);
        assert_eq!(delivery.destination_label(&order), "Green Leaf Kitchen");

        delivery.advance().unwrap();
        assert_eq!(delivery.active_destination(&order), order.dropoff_point);
        assert_eq!(delivery.destination_label(&order), "Hope Shelter");

        delivery.advance().unwrap();
        assert_eq!(delivery.active_destination(&order), order.dropoff_point);
    }

    #[test]
    fn status_text_per_phase() {
        let mut delivery = Delivery::new();

        assert_eq!(delivery.status_text(), "Heading to Restaurant");
        delivery.advance().unwrap();
        assert_eq!(delivery.status_text(), "Delivering to NGO");
        delivery.advance().unwrap();
        assert_eq!(delivery.status_text(), "Delivery complete");
    }
}
