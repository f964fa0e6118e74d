//! # System Lifecycle
//!
//! Starting, wiring and stopping the tracking actors.
//!
//! The registry is created first (its constructor hands back the client),
//! spawned, and only then are the services that need a live connection wired
//! to it. Shutdown runs the other way round: the registry is asked to stop,
//! which closes every connection's frame stream, which in turn ends the
//! delivery watcher.
//!
//! ```rust,ignore
//! let system = TrackingSystem::start(config, resolver, store, TokioClock::shared()).await?;
//! system.dispatch.ship("order_1".into(), "Depot", "Customer").await?;
//! let mut conn = system.tracking_client.connect().await?;
//! while let Some(text) = conn.recv_text().await { /* write to the socket */ }
//! system.shutdown().await?;
//! ```

pub mod tracing;
pub mod tracking_system;

pub use self::tracing::*;
pub use tracking_system::*;
