use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::{DynPositionSource, LocationErrorKind, PositionEvent};
use crate::entities::{GeoPoint, PositionSample};
use crate::error::Error;

/// Latest known position plus the heading derived from the immediately
/// preceding fix. Only one historical fix is retained.
#[derive(Clone, Debug)]
pub struct PositionState {
    current: GeoPoint,
    last_fix: Option<GeoPoint>,
    heading_degrees: f64,
    warning: Option<String>,
}

impl PositionState {
    pub fn new(default_position: GeoPoint) -> Self {
        Self {
            current: default_position,
            last_fix: None,
            heading_degrees: 0.0,
            warning: None,
        }
    }

    pub fn position(&self) -> GeoPoint {
        self.current
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading_degrees
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Consume one sample: derive heading from the previous fix (left
    /// unchanged until two distinct fixes have been seen), then replace it.
    pub fn apply_fix(&mut self, sample: &PositionSample) {
        if let Some(previous) = self.last_fix {
            if previous != sample.point {
                self.heading_degrees = previous.initial_bearing_to(&sample.point);
            }
        }

        self.last_fix = Some(sample.point);
        self.current = sample.point;
        self.warning = None;
    }

    /// A stream failure keeps the last known (or default) position and
    /// surfaces a user-facing warning.
    pub fn apply_failure(&mut self, kind: LocationErrorKind) {
        self.warning = Some(kind.warning_text());
    }

    /// Permanent fallback for a device with no geolocation capability.
    pub fn mark_unsupported(&mut self) {
        self.warning = Some("Geolocation is not supported. Using default location.".into());
    }
}

pub struct Subscription {
    forwarder: JoinHandle<()>,
}

impl Subscription {
    /// Cancels the forwarding task. Safe to call more than once.
    pub fn stop(&self) {
        self.forwarder.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// Subscribes to the device position stream and forwards its events into
/// `tx`. If no fix arrives within `first_fix_timeout` a timeout failure is
/// forwarded once and forwarding continues rather than blocking the
/// session indefinitely.
#[tracing::instrument(skip(source, tx))]
pub async fn watch_positions(
    source: DynPositionSource,
    tx: async_channel::Sender<PositionEvent>,
    first_fix_timeout: Duration,
) -> Result<Subscription, Error> {
    let updates = source.subscribe().await?;

    let forwarder = tokio::spawn(async move {
        match tokio::time::timeout(first_fix_timeout, updates.recv()).await {
            Err(_) => {
                tracing::warn!("no position fix within {:?}", first_fix_timeout);

                if tx
                    .send(PositionEvent::Failed(LocationErrorKind::Timeout))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Ok(Err(_)) => return,
            Ok(Ok(event)) => {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        }

        while let Ok(event) = updates.recv().await {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    Ok(Subscription { forwarder })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio_test::block_on;

    use crate::api::PositionSource;
    use crate::api::PositionUpdates;

    fn sample(latitude: f64, longitude: f64) -> PositionSample {
        PositionSample::new(GeoPoint::new(latitude, longitude))
    }

    #[test]
    fn heading_unchanged_until_second_fix() {
        let mut state = PositionState::new(GeoPoint::new(12.9716, 77.5946));

        assert_eq!(state.heading_degrees(), 0.0);

        state.apply_fix(&sample(12.97, 77.59));
        assert_eq!(state.heading_degrees(), 0.0);
        assert_eq!(state.position(), GeoPoint::new(12.97, 77.59));

        state.apply_fix(&sample(12.98, 77.59));
        assert!((state.heading_degrees() - 0.0).abs() < 1e-6);

        state.apply_fix(&sample(12.98, 77.60));
        assert!((state.heading_degrees() - 90.0).abs() < 0.5);
    }

    #[test]
    fn heading_stays_in_range_over_any_walk() {
        let mut state = PositionState::new(GeoPoint::new(0.0, 0.0));

        let walk = [
            (0.0, 0.0),
            (0.1, -0.1),
            (-0.2, -0.1),
            (-0.2, -0.1),
            (0.3, 0.4),
        ];

        for (latitude, longitude) in walk {
            state.apply_fix(&sample(latitude, longitude));
            let heading = state.heading_degrees();
            assert!((0.0..360.0).contains(&heading), "heading {}", heading);
        }
    }

    #[test]
    fn duplicate_fix_keeps_previous_heading() {
        let mut state = PositionState::new(GeoPoint::new(0.0, 0.0));

        state.apply_fix(&sample(0.0, 0.0));
        state.apply_fix(&sample(0.0, 1.0));
        let heading = state.heading_degrees();

        state.apply_fix(&sample(0.0, 1.0));
        assert_eq!(state.heading_degrees(), heading);
    }

    #[test]
    fn failure_sets_warning_and_keeps_position() {
        let mut state = PositionState::new(GeoPoint::new(12.9716, 77.5946));

        state.apply_fix(&sample(12.97, 77.59));
        state.apply_failure(LocationErrorKind::PermissionDenied);

        assert_eq!(
            state.warning(),
            Some("Location access denied. Please enable location services.")
        );
        assert_eq!(state.position(), GeoPoint::new(12.97, 77.59));

        state.apply_fix(&sample(12.98, 77.60));
        assert!(state.warning().is_none());
    }

    struct SilentSource {
        _keepalive: async_channel::Sender<PositionEvent>,
        updates: PositionUpdates,
    }

    impl SilentSource {
        fn new() -> Self {
            let (tx, rx) = async_channel::unbounded();
            Self {
                _keepalive: tx,
                updates: rx,
            }
        }
    }

    #[async_trait]
    impl PositionSource for SilentSource {
        async fn subscribe(&self) -> Result<PositionUpdates, Error> {
            Ok(self.updates.clone())
        }
    }

    #[test]
    fn first_fix_timeout_is_surfaced() {
        block_on(async {
            let (tx, rx) = async_channel::unbounded();

            let subscription =
                watch_positions(Arc::new(SilentSource::new()), tx, Duration::from_millis(20))
                    .await
                    .unwrap();

            match rx.recv().await.unwrap() {
                PositionEvent::Failed(kind) => assert_eq!(kind, LocationErrorKind::Timeout),
                other => panic!("unexpected event: {:?}", other),
            }

            subscription.stop();
            subscription.stop();
        });
    }
}
