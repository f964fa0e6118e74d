//! # Observability & Tracing
//!
//! Structured logging for the tracking core, built on the `tracing` crate.
//!
//! ## What Gets Traced
//!
//! - **Registry lifecycle**: startup (fan-out mode, tick interval) and shutdown
//! - **Connections**: connect, disconnect, subscriptions, pruned observers
//! - **Tracks**: start, pause/resume/stop, route finished
//! - **Dropped input**: malformed messages, empty routes, skipped waypoints
//!
//! Every event carries `order_id` and/or `connection` as fields, so a single
//! order can be followed with an ordinary log filter.
//!
//! ## Usage
//!
//! ```bash
//! # Lifecycle and control events
//! RUST_LOG=info cargo run
//!
//! # Every inbound message and every location frame
//! RUST_LOG=debug cargo run
//!
//! # Only the registry
//! RUST_LOG=delivery_tracker::registry=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a short delivery reads:
//!
//! ```text
//! INFO Registry started fanout=Broadcast tick_ms=1200
//! INFO Connected connection=conn_1 size=1
//! INFO ship: Shipped order_id=order_1 eta_s=11119.49
//! INFO Track started order_id=order_1 index=0 total=3 size=1
//! INFO Route finished order_id=order_1
//! INFO Delivered order_id=order_1
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Call once at startup; a second call panics because a global subscriber is
/// already set.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
