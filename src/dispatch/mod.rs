//! # Dispatch
//!
//! The owner of tracked deliveries. A ship event resolves the route, starts
//! the simulated vehicle and records the estimate; a [`DeliveryWatcher`]
//! listens on the channel and persists the terminal status once the vehicle
//! reports `route-finished`.
//!
//! Completion is decided here, server-side, from actual frames rather than by
//! comparing the wall clock with the ETA computed at dispatch time.

pub mod collaborators;
pub mod error;

pub use collaborators::*;
pub use error::*;

use crate::clients::{ClientError, Connection, TrackingClient};
use crate::clock::Clock;
use crate::eta::DeliveryEstimate;
use crate::model::{ConnectionId, Frame, OrderId};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Ships orders onto the tracking channel.
#[derive(Clone)]
pub struct DispatchService {
    resolver: Arc<dyn RouteResolver>,
    store: Arc<dyn OrderStore>,
    tracking: TrackingClient,
    clock: Arc<dyn Clock>,
    watcher: ConnectionId,
    speed_mps: f64,
}

impl DispatchService {
    /// Creates the service and the watcher that must be spawned next to it.
    pub async fn new(
        resolver: Arc<dyn RouteResolver>,
        store: Arc<dyn OrderStore>,
        tracking: TrackingClient,
        clock: Arc<dyn Clock>,
        speed_mps: f64,
    ) -> Result<(Self, DeliveryWatcher), ClientError> {
        let connection = tracking.connect().await?;
        let watcher = DeliveryWatcher {
            connection,
            store: store.clone(),
            clock: clock.clone(),
        };
        let service = Self {
            resolver,
            store,
            tracking,
            clock,
            watcher: watcher.connection.id(),
            speed_mps,
        };
        Ok((service, watcher))
    }

    /// Resolves the route between two addresses and starts tracking it.
    ///
    /// When the route cannot be resolved, or the store rejects the order,
    /// nothing is started and the error is returned to the caller.
    #[instrument(skip(self))]
    pub async fn ship(&self, order_id: OrderId, from: &str, to: &str) -> Result<DeliveryEstimate, DispatchError> {
        let route = match self.resolver.resolve(from, to).await {
            Ok(route) if !route.points.is_empty() => route,
            Ok(_) => {
                return Err(RouteError::NoPath {
                    from: from.to_string(),
                    to: to.to_string(),
                }
                .into())
            }
            Err(e) => {
                warn!(error = %e, "Route resolution failed, not tracking");
                return Err(e.into());
            }
        };

        // Recorded first, so a store failure leaves no vehicle running.
        let estimate = DeliveryEstimate::new(&route.points, self.speed_mps, self.clock.system_time());
        self.store.mark_shipped(&order_id, estimate).await?;
        self.tracking.subscribe(self.watcher, order_id.clone()).await?;
        self.tracking.start_track(order_id.clone(), route.points).await?;

        info!(eta_s = estimate.eta_seconds, "Shipped");
        Ok(estimate)
    }
}

/// Persists `Delivered` for every order whose route finishes.
pub struct DeliveryWatcher {
    connection: Connection,
    store: Arc<dyn OrderStore>,
    clock: Arc<dyn Clock>,
}

impl DeliveryWatcher {
    /// Runs until the registry shuts down.
    pub async fn run(mut self) {
        info!(connection = %self.connection.id(), "Delivery watcher started");
        while let Some(frame) = self.connection.recv().await {
            let Frame::RouteFinished { order_id } = frame else {
                continue;
            };
            let delivered_at = self.clock.system_time();
            match self.store.mark_delivered(&order_id, delivered_at).await {
                Ok(()) => info!(%order_id, "Delivered"),
                Err(e) => warn!(%order_id, error = %e, "Could not record delivery"),
            }
        }
        info!("Delivery watcher stopped");
    }
}
