//! Demo: ships one order along a short canned route and prints the channel
//! traffic a browser client would see, including a pause, a resume and a
//! reconnect that recovers progress.

use delivery_tracker::clock::TokioClock;
use delivery_tracker::config::TrackerConfig;
use delivery_tracker::dispatch::Route;
use delivery_tracker::eta::{format_eta, remaining_eta_seconds};
use delivery_tracker::lifecycle::{setup_tracing, TrackingSystem};
use delivery_tracker::mock::{InMemoryOrderStore, MockRouteResolver};
use delivery_tracker::model::{Frame, OrderId, Waypoint};
use std::sync::Arc;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = TrackerConfig::from_env();
    info!(?config, "Starting delivery demo");

    let points: Vec<Waypoint> = [
        (116.3975, 39.9087),
        (116.4010, 39.9110),
        (116.4052, 39.9135),
        (116.4101, 39.9150),
        (116.4160, 39.9172),
    ]
    .into_iter()
    .map(Waypoint::from)
    .collect();
    let route = Route {
        origin: points[0],
        dest: points[points.len() - 1],
        points: points.clone(),
    };

    let resolver = MockRouteResolver::new();
    resolver.expect_resolve("Warehouse 3", "Customer").return_ok(route);
    let store = InMemoryOrderStore::new();
    let order_id = OrderId::from("order_1");
    store.insert_pending(order_id.clone());

    let system = TrackingSystem::start(
        config.clone(),
        Arc::new(resolver),
        Arc::new(store.clone()),
        TokioClock::shared(),
    )
    .await
    .map_err(|e| e.to_string())?;

    let mut browser = system.tracking_client.connect().await.map_err(|e| e.to_string())?;

    let span = tracing::info_span!("shipping");
    let estimate = async {
        system
            .dispatch
            .ship(order_id.clone(), "Warehouse 3", "Customer")
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;
    info!(eta = %format_eta(estimate.eta_seconds), "Order shipped");

    while let Some(frame) = browser.recv().await {
        println!("{}", frame.to_json().map_err(|e| e.to_string())?);
        match frame {
            Frame::Location { index: 1, .. } => {
                system.tracking_client.pause(order_id.clone()).await.map_err(|e| e.to_string())?;
            }
            Frame::RoutePaused { .. } => {
                // Simulate the browser dropping and coming back.
                browser.close().await.map_err(|e| e.to_string())?;
                browser = system.tracking_client.connect().await.map_err(|e| e.to_string())?;
                browser
                    .send_text(format!(r#"{{"type":"request-current","orderId":"{order_id}"}}"#))
                    .await
                    .map_err(|e| e.to_string())?;
            }
            Frame::CurrentState { index, .. } => {
                let left = remaining_eta_seconds(&points, index, config.speed_mps);
                info!(index, remaining = %format_eta(left), "Recovered progress");
                system.tracking_client.resume(order_id.clone()).await.map_err(|e| e.to_string())?;
            }
            Frame::RouteFinished { .. } => break,
            _ => {}
        }
    }

    // Give the watcher a moment to persist the delivery.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    if let Some(record) = store.get(&order_id) {
        info!(status = ?record.status, "Final order status");
    }

    system.shutdown().await?;
    info!("Demo completed");
    Ok(())
}
