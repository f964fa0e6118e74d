//! Error types for the tracking core.

use crate::model::{ConnectionId, OrderId};
use thiserror::Error;

/// Errors raised while driving players or handling channel traffic.
///
/// None of these are fatal to the registry: each is logged and the registry
/// keeps serving other orders.
#[derive(Debug, Error)]
pub enum TrackError {
    /// A start was requested with no waypoints.
    #[error("Empty route for order {0}")]
    Configuration(OrderId),

    /// A waypoint had a non-finite coordinate and was skipped.
    #[error("Invalid waypoint {index} for order {order_id}")]
    InvalidWaypoint { order_id: OrderId, index: usize },

    /// No player is registered for the order.
    #[error("No track for order {0}")]
    NotFound(OrderId),

    /// The player was stopped and must be discarded.
    #[error("Track for order {0} is stopped")]
    Stopped(OrderId),

    /// The route already finished and the new one does not extend it.
    #[error("Track for order {0} already finished")]
    Finished(OrderId),

    /// A frame could not be delivered to one observer.
    #[error("Send to connection {connection} failed: {reason}")]
    Transport { connection: ConnectionId, reason: String },

    /// An inbound message could not be parsed.
    #[error("Malformed message: {0}")]
    Protocol(#[from] serde_json::Error),
}
