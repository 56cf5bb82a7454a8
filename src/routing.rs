use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::DynRouter;
use crate::entities::{GeoPoint, RouteResult};
use crate::error::Error;

#[derive(Clone, Debug)]
pub struct RoutePolicy {
    pub settle_delay: Duration,
    pub request_timeout: Duration,
    pub retry_backoff: Duration,
    pub min_origin_move_meters: f64,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            retry_backoff: Duration::from_secs(5),
            min_origin_move_meters: 30.0,
        }
    }
}

/// Completion report of one routing request. `seq` identifies the request
/// it answers; the coordinator ignores any outcome that is not the most
/// recent one it issued.
#[derive(Debug)]
pub struct RouteOutcome {
    pub seq: u64,
    pub result: Result<RouteResult, Error>,
}

struct InFlight {
    seq: u64,
    task: JoinHandle<()>,
}

/// Obtains road routes between the current position and the active
/// destination, coalescing noisy input and recovering from provider
/// failures without blocking the session loop.
pub struct RouteCoordinator {
    router: DynRouter,
    policy: RoutePolicy,
    seq: u64,
    in_flight: Option<InFlight>,
    last_request: Option<(GeoPoint, GeoPoint)>,
    route: Option<RouteResult>,
    failed: bool,
}

impl RouteCoordinator {
    pub fn new(router: DynRouter, policy: RoutePolicy) -> Self {
        Self {
            router,
            policy,
            seq: 0,
            in_flight: None,
            last_request: None,
            route: None,
            failed: false,
        }
    }

    pub fn route(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    /// Issues a new request only when the destination changed, the origin
    /// moved beyond the threshold, or no route exists yet and nothing is
    /// pending. After a failed retry the coordinator stays quiet until the
    /// next such input change.
    #[tracing::instrument(skip(self, outcomes))]
    pub fn consider(
        &mut self,
        origin: GeoPoint,
        destination: GeoPoint,
        outcomes: &async_channel::Sender<RouteOutcome>,
    ) {
        let refresh = match self.last_request {
            None => true,
            Some((last_origin, last_destination)) => {
                destination != last_destination
                    || origin.haversine_meters_to(&last_origin) > self.policy.min_origin_move_meters
                    || (self.route.is_none() && !self.failed && self.in_flight.is_none())
            }
        };

        if !refresh {
            return;
        }

        self.failed = false;
        self.seq += 1;
        self.last_request = Some((origin, destination));

        if let Some(in_flight) = self.in_flight.take() {
            tracing::debug!(seq = in_flight.seq, "superseding in-flight route request");
            in_flight.task.abort();
        }

        let router = Arc::clone(&self.router);
        let policy = self.policy.clone();
        let outcomes = outcomes.clone();
        let seq = self.seq;

        let task = tokio::spawn(async move {
            tokio::time::sleep(policy.settle_delay).await;

            let mut result = request(&router, origin, destination, policy.request_timeout).await;

            if result.is_err() {
                tracing::warn!(seq, "route request failed, retrying once");
                tokio::time::sleep(policy.retry_backoff).await;
                result = request(&router, origin, destination, policy.request_timeout).await;
            }

            let _ = outcomes.send(RouteOutcome { seq, result }).await;
        });

        self.in_flight = Some(InFlight {
            seq: self.seq,
            task,
        });
    }

    /// Applies a completed request. Outcomes for superseded requests are
    /// dropped and `None` is returned; otherwise the stored route is
    /// replaced wholesale (or the failure latch set) and the result is
    /// surfaced once to the caller.
    pub fn apply(&mut self, outcome: RouteOutcome) -> Option<Result<RouteResult, Error>> {
        if outcome.seq != self.seq {
            tracing::debug!(
                seq = outcome.seq,
                current = self.seq,
                "discarding stale route response"
            );
            return None;
        }

        self.in_flight = None;

        match outcome.result {
            Ok(route) => {
                self.route = Some(route.clone());
                Some(Ok(route))
            }
            Err(err) => {
                tracing::warn!(seq = outcome.seq, %err, "route computation failed");
                self.failed = true;
                Some(Err(err))
            }
        }
    }

    /// Phase change: the stored route was computed for a superseded
    /// destination and must never be shown again.
    pub fn reset(&mut self) {
        self.cancel();
        self.route = None;
        self.last_request = None;
        self.failed = false;
    }

    /// Cancels any in-flight request and invalidates outcomes already
    /// queued for it.
    pub fn cancel(&mut self) {
        self.seq += 1;

        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
        }
    }
}

async fn request(
    router: &DynRouter,
    origin: GeoPoint,
    destination: GeoPoint,
    timeout: Duration,
) -> Result<RouteResult, Error> {
    tokio::time::timeout(timeout, router.fetch_route(origin, destination)).await?
}
