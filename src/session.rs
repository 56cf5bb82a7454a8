use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use uuid::Uuid;

use crate::api::{DynPositionSource, DynRouter, PositionEvent};
use crate::entities::{Delivery, GeoPoint, Order, Phase, ViewModel};
use crate::error::{invalid_state_error, unexpected_error, Error};
use crate::routing::{RouteCoordinator, RouteOutcome, RoutePolicy};
use crate::tracking::{self, PositionState, Subscription};
use crate::viewport::{ViewConfig, ViewportController};

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub first_fix_timeout: Duration,
    pub default_position: GeoPoint,
    pub route: RoutePolicy,
    pub view: ViewConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            first_fix_timeout: Duration::from_secs(15),
            default_position: GeoPoint::new(12.9716, 77.5946),
            route: RoutePolicy::default(),
            view: ViewConfig::default(),
        }
    }
}

enum Control {
    Advance {
        reply: oneshot::Sender<Result<Phase, Error>>,
    },
    ToggleView,
    Stop,
}

struct SessionState {
    order: Order,
    delivery: Delivery,
    positions: PositionState,
    coordinator: RouteCoordinator,
    viewport: ViewportController,
    routing_warning: Option<String>,
    route_tx: async_channel::Sender<RouteOutcome>,
}

impl SessionState {
    fn refresh_route(&mut self) {
        let origin = self.positions.position();
        let destination = self.delivery.active_destination(&self.order);

        self.coordinator.consider(origin, destination, &self.route_tx);
    }

    fn view_model(&self) -> ViewModel {
        let position = self.positions.position();
        let relevant = [
            position,
            self.order.pickup_point,
            self.order.dropoff_point,
        ];

        ViewModel {
            position,
            heading_degrees: self.positions.heading_degrees(),
            mode: self.viewport.mode(),
            viewport: self.viewport.viewport(position, &relevant),
            destination: self.delivery.active_destination(&self.order),
            destination_label: self.delivery.destination_label(&self.order).to_string(),
            route: self.coordinator.route().cloned(),
            phase: self.delivery.phase(),
            status_text: self.delivery.status_text(),
            location_warning: self.positions.warning().map(str::to_string),
            routing_warning: self.routing_warning.clone(),
        }
    }
}

/// One live tracking session for one active order. Owns the position
/// subscription and the single-writer event loop; publishes consistent
/// `ViewModel` snapshots through a watch channel.
pub struct TrackingSession {
    id: Uuid,
    controls: async_channel::Sender<Control>,
    views: watch::Receiver<ViewModel>,
    subscription: Mutex<Option<Subscription>>,
}

impl TrackingSession {
    #[tracing::instrument(skip(order, source, router, config), fields(order_id = %order.id))]
    pub async fn start(
        order: Order,
        source: DynPositionSource,
        router: DynRouter,
        config: SessionConfig,
    ) -> Result<Self, Error> {
        let id = Uuid::new_v4();

        let (position_tx, position_rx) = async_channel::unbounded();
        let (route_tx, route_rx) = async_channel::unbounded();
        let (control_tx, control_rx) = async_channel::unbounded();

        let mut positions = PositionState::new(config.default_position);

        let subscription =
            match tracking::watch_positions(source, position_tx, config.first_fix_timeout).await {
                Ok(subscription) => Some(subscription),
                Err(err) => {
                    tracing::warn!(%err, "position stream unavailable, using default position");
                    positions.mark_unsupported();
                    None
                }
            };

        let mut state = SessionState {
            order,
            delivery: Delivery::new(),
            positions,
            coordinator: RouteCoordinator::new(router, config.route.clone()),
            viewport: ViewportController::new(config.view.clone()),
            routing_warning: None,
            route_tx,
        };

        state.refresh_route();

        let (view_tx, views) = watch::channel(state.view_model());

        tokio::spawn(session_loop(id, state, view_tx, position_rx, route_rx, control_rx));

        Ok(Self {
            id,
            controls: control_tx,
            views,
            subscription: Mutex::new(subscription),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Snapshot stream for the presentation layer.
    pub fn view_models(&self) -> watch::Receiver<ViewModel> {
        self.views.clone()
    }

    /// Signals "picked up" / "delivered". Advancing a completed delivery
    /// (or a stopped session) fails loudly.
    pub async fn advance_phase(&self) -> Result<Phase, Error> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.controls
            .send(Control::Advance { reply: reply_tx })
            .await
            .map_err(|_| invalid_state_error())?;

        reply_rx.await.map_err(|_| unexpected_error())?
    }

    /// Flips overview / street-level. Never touches route or phase state.
    pub async fn toggle_view_mode(&self) -> Result<(), Error> {
        self.controls
            .send(Control::ToggleView)
            .await
            .map_err(|_| invalid_state_error())
    }

    /// Ends the session: halts the position subscription synchronously and
    /// asks the loop to cancel any in-flight routing work. Idempotent;
    /// teardown failures are logged, never returned.
    pub fn stop(&self) {
        match self.subscription.lock() {
            Ok(mut guard) => {
                if let Some(subscription) = guard.take() {
                    subscription.stop();
                }
            }
            Err(_) => tracing::warn!(session = %self.id, "subscription lock poisoned during teardown"),
        }

        // loop may already be gone on a second stop
        let _ = self.controls.try_send(Control::Stop);
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[tracing::instrument(name = "session", skip_all, fields(session = %id))]
async fn session_loop(
    id: Uuid,
    mut state: SessionState,
    view_tx: watch::Sender<ViewModel>,
    position_rx: async_channel::Receiver<PositionEvent>,
    route_rx: async_channel::Receiver<RouteOutcome>,
    control_rx: async_channel::Receiver<Control>,
) {
    tracing::info!("tracking session started");

    let mut positions_open = true;

    loop {
        tokio::select! {
            event = position_rx.recv(), if positions_open => match event {
                Ok(PositionEvent::Fix(sample)) => {
                    state.positions.apply_fix(&sample);
                    state.refresh_route();
                    let _ = view_tx.send(state.view_model());
                }
                Ok(PositionEvent::Failed(kind)) => {
                    state.positions.apply_failure(kind);
                    let _ = view_tx.send(state.view_model());
                }
                Err(_) => {
                    positions_open = false;
                }
            },
            outcome = route_rx.recv() => {
                let outcome = match outcome {
                    Ok(outcome) => outcome,
                    Err(_) => break,
                };

                match state.coordinator.apply(outcome) {
                    Some(Ok(_)) => {
                        state.routing_warning = None;
                        let _ = view_tx.send(state.view_model());
                    }
                    Some(Err(_)) => {
                        state.routing_warning =
                            Some("Unable to compute a route right now.".into());
                        let _ = view_tx.send(state.view_model());
                    }
                    None => {}
                }
            },
            control = control_rx.recv() => match control {
                Ok(Control::Advance { reply }) => {
                    let result = state.delivery.advance();

                    match &result {
                        Ok(Phase::Completed) => {
                            // nothing left to route to
                            state.coordinator.reset();
                            state.routing_warning = None;
                        }
                        Ok(phase) => {
                            tracing::info!(phase = %phase.name(), "delivery advanced");
                            state.coordinator.reset();
                            state.routing_warning = None;
                            state.refresh_route();
                        }
                        Err(err) => {
                            tracing::warn!(%err, "rejected phase advance");
                        }
                    }

                    let _ = reply.send(result);
                    let _ = view_tx.send(state.view_model());
                }
                Ok(Control::ToggleView) => {
                    state.viewport.toggle();
                    let _ = view_tx.send(state.view_model());
                }
                Ok(Control::Stop) | Err(_) => break,
            },
        }
    }

    state.coordinator.cancel();
    tracing::info!("tracking session stopped");
}
