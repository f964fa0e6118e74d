//! Typed handles to the registry task.
//!
//! [`TrackingClient`] is the server-side handle (ship events, snapshots).
//! [`Connection`] is one observer on the tracking channel: a transport adapter
//! feeds it inbound text and drains its frames.

pub mod connection;
pub mod error;
pub mod tracking_client;

pub use connection::*;
pub use error::*;
pub use tracking_client::*;
