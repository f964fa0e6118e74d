#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Delivery Tracker
//!
//! > **Live delivery simulation for an order-tracking service.**
//!
//! Each shipped order gets a simulated vehicle that walks a precomputed route
//! and streams its position over one shared JSON channel. Clients can pause,
//! resume and stop a vehicle, and a client that reconnects mid-route picks up
//! where the vehicle already is instead of restarting it from the origin.
//!
//! ## 🏗️ Design
//!
//! ### One actor, many vehicles
//! The [`TrackRegistry`](registry::TrackRegistry) runs in a single Tokio task.
//! It owns every [`TrackPlayer`](player::TrackPlayer) and every connection, and
//! processes requests sequentially, so no locks guard the player table and two
//! control messages for the same order can never race.
//!
//! ### Players are plain state machines
//! A player never sleeps and never touches the network. The registry loop
//! waits for the earliest player deadline and calls `tick`; pause and stop
//! simply clear the deadline. Tests drive players synchronously, or run the
//! whole registry on Tokio's paused clock.
//!
//! ### Fan-out
//! Frames are broadcast to every connection by default, which is what existing
//! clients expect. [`FanoutMode::Subscribed`](config::FanoutMode) routes an
//! order's frames only to connections that subscribed to it.
//!
//! ## 🗺️ Module Tour
//!
//! - [`model`]: waypoints, order ids, inbound [`ClientMessage`](model::ClientMessage)s and outbound [`Frame`](model::Frame)s.
//! - [`eta`]: haversine distance, route length, ETA seconds and human-readable durations.
//! - [`player`]: the per-order state machine.
//! - [`registry`]: the actor that owns players and connections.
//! - [`clients`]: [`TrackingClient`](clients::TrackingClient) and per-observer [`Connection`](clients::Connection) handles.
//! - [`dispatch`]: ships orders via a [`RouteResolver`](dispatch::RouteResolver) and records deliveries in an [`OrderStore`](dispatch::OrderStore).
//! - [`lifecycle`]: [`TrackingSystem`](lifecycle::TrackingSystem) wiring and [`setup_tracing`](lifecycle::setup_tracing).
//! - [`config`], [`clock`]: settings and the injected time source.
//! - [`mock`]: in-memory collaborators for tests and the demo.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo delivery with info logs
//! RUST_LOG=info cargo run
//!
//! # Faster ticks
//! TRACKER_TICK_INTERVAL_MS=200 RUST_LOG=debug cargo run
//! ```

pub mod clients;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod eta;
pub mod lifecycle;
pub mod mock;
pub mod model;
pub mod player;
pub mod registry;
