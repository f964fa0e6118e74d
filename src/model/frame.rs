//! Outbound frames written to the tracking channel.

use super::{OrderId, Waypoint};
use serde::{Deserialize, Serialize};

/// One outbound message describing a position or a state transition.
///
/// Serialised with a kebab-case `type` tag and camelCase fields, e.g.
/// `{"type":"route-paused","orderId":"42","index":3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Frame {
    Pong,
    NoTrack {
        order_id: OrderId,
    },
    CurrentState {
        order_id: OrderId,
        index: usize,
        total: usize,
        position: Option<Waypoint>,
    },
    Location {
        order_id: OrderId,
        index: usize,
        total: usize,
        position: Waypoint,
    },
    RouteFinished {
        order_id: OrderId,
    },
    RoutePaused {
        order_id: OrderId,
        index: usize,
    },
    RouteResumed {
        order_id: OrderId,
    },
    RouteStopped {
        order_id: OrderId,
    },
}

impl Frame {
    /// The order this frame is about, if any.
    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            Frame::Pong => None,
            Frame::NoTrack { order_id }
            | Frame::CurrentState { order_id, .. }
            | Frame::Location { order_id, .. }
            | Frame::RouteFinished { order_id }
            | Frame::RoutePaused { order_id, .. }
            | Frame::RouteResumed { order_id }
            | Frame::RouteStopped { order_id } => Some(order_id),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn current_state(order_id: OrderId, snapshot: TrackSnapshot) -> Self {
        Frame::CurrentState {
            order_id,
            index: snapshot.index,
            total: snapshot.total,
            position: snapshot.position,
        }
    }
}

/// Progress of a player as reported to a reconnecting client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSnapshot {
    pub index: usize,
    pub total: usize,
    pub position: Option<Waypoint>,
}

impl TrackSnapshot {
    /// True once every waypoint has been consumed.
    ///
    /// A client sitting at `index == total - 1` has not seen the final frame
    /// yet, so it is not complete.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.index >= self.total
    }
}
