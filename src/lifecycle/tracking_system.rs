use crate::clients::{ClientError, TrackingClient};
use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::dispatch::{DispatchService, OrderStore, RouteResolver};
use crate::registry::TrackRegistry;
use std::sync::Arc;
use tracing::{error, info};

/// Owns the running registry and dispatch tasks.
pub struct TrackingSystem {
    /// Client for the registry (connections, snapshots, control).
    pub tracking_client: TrackingClient,

    /// Ships orders and records deliveries.
    pub dispatch: DispatchService,

    /// Task handles for all running actors (used for graceful shutdown).
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl TrackingSystem {
    /// Spawns the registry and the delivery watcher.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn start(
        config: TrackerConfig,
        resolver: Arc<dyn RouteResolver>,
        store: Arc<dyn OrderStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ClientError> {
        let (registry, tracking_client) = TrackRegistry::new(&config, clock.clone());
        let registry_handle = tokio::spawn(registry.run());

        let (dispatch, watcher) = DispatchService::new(
            resolver,
            store,
            tracking_client.clone(),
            clock,
            config.speed_mps,
        )
        .await?;
        let watcher_handle = tokio::spawn(watcher.run());

        info!(fanout = ?config.fanout, "Tracking system started");
        Ok(Self {
            tracking_client,
            dispatch,
            handles: vec![registry_handle, watcher_handle],
        })
    }

    /// Stops the registry and waits for every task to finish.
    ///
    /// Returns an error if a task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down tracking system...");

        // The registry may already be gone; either way its loop is over.
        let _ = self.tracking_client.shutdown().await;
        drop(self.dispatch);
        drop(self.tracking_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Task failed: {:?}", e);
                return Err(format!("Task failed: {:?}", e));
            }
        }

        info!("Tracking system shutdown complete.");
        Ok(())
    }
}
