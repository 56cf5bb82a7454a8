use std::sync::Arc;
use std::time::Duration;

use courier::api::DynRouter;
use courier::entities::{GeoPoint, Order};
use courier::external::osrm::OsrmRouter;
use courier::session::{SessionConfig, TrackingSession};
use courier::simulation::{SimulatedPositions, StraightLineRouter};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let order = Order {
        id: "demo-order".into(),
        pickup_point: GeoPoint::new(12.97, 77.59),
        dropoff_point: GeoPoint::new(12.98, 77.60),
        pickup_label: "Green Leaf Kitchen".into(),
        dropoff_label: "Hope Shelter".into(),
    };

    let path = vec![
        GeoPoint::new(12.9650, 77.5850),
        GeoPoint::new(12.9665, 77.5865),
        GeoPoint::new(12.9680, 77.5880),
        GeoPoint::new(12.9695, 77.5890),
        GeoPoint::new(12.9700, 77.5900),
        GeoPoint::new(12.9720, 77.5920),
        GeoPoint::new(12.9740, 77.5940),
        GeoPoint::new(12.9760, 77.5960),
        GeoPoint::new(12.9780, 77.5980),
        GeoPoint::new(12.9800, 77.6000),
    ];

    let source = Arc::new(SimulatedPositions::new(
        path,
        Duration::from_secs(1),
        0.0001,
    ));

    let router: DynRouter = match OsrmRouter::from_env() {
        Ok(router) => Arc::new(router),
        Err(_) => {
            tracing::warn!("ROUTING_API_BASE not set, using straight-line routes");
            Arc::new(StraightLineRouter::new(16))
        }
    };

    let session = TrackingSession::start(order, source, router, SessionConfig::default())
        .await
        .unwrap();

    let mut views = session.view_models();
    tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow().clone();

            tracing::info!(
                status = %view.status_text,
                latitude = view.position.latitude,
                longitude = view.position.longitude,
                heading = view.heading_degrees,
                instruction = view
                    .route
                    .as_ref()
                    .map(|route| route.next_instruction.as_str())
                    .unwrap_or(""),
                "view updated"
            );
        }
    });

    tokio::time::sleep(Duration::from_secs(5)).await;
    session.advance_phase().await.unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    session.advance_phase().await.unwrap();

    session.stop();
}
