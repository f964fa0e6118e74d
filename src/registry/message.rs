//! # Registry Requests
//!
//! The messages a [`TrackingClient`](crate::clients::TrackingClient) sends to
//! the registry task. Everything that touches the player table or the
//! connection table funnels through this enum, so there is exactly one place
//! where that state is mutated.

use crate::model::{ClientMessage, ConnectionId, Frame, OrderId, TrackSnapshot};
use tokio::sync::{mpsc, oneshot};

/// Type alias for the one-shot response channel used by the registry.
pub type Response<T> = oneshot::Sender<T>;

/// Per-connection outbound queue. Unbounded so a send never blocks the
/// registry loop; frames stay in order per connection.
pub type FrameSink = mpsc::UnboundedSender<Frame>;

/// Table sizes reported by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub players: usize,
    pub connections: usize,
}

#[derive(Debug)]
pub enum TrackRequest {
    /// Register an observer and get its id back.
    Connect {
        sink: FrameSink,
        respond_to: Response<ConnectionId>,
    },
    Disconnect {
        connection: ConnectionId,
    },
    /// Raw channel text from a connection, parsed inside the registry.
    Text {
        connection: ConnectionId,
        text: String,
    },
    /// An already-typed message. `connection` is `None` for server-side
    /// callers (e.g. a ship event) that expect no reply.
    Message {
        connection: Option<ConnectionId>,
        message: ClientMessage,
    },
    Snapshot {
        order_id: OrderId,
        respond_to: Response<Option<TrackSnapshot>>,
    },
    Stats {
        respond_to: Response<RegistryStats>,
    },
    /// Stops the loop even while connections still hold client handles.
    Shutdown,
}
