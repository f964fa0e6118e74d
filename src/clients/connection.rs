use super::{ClientError, TrackingClient};
use crate::model::{ClientMessage, ConnectionId, Frame, OrderId};
use crate::registry::TrackRequest;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One observer on the tracking channel.
///
/// Inbound text goes to the registry through [`send_text`](Self::send_text);
/// outbound frames arrive in order on [`recv`](Self::recv). Call
/// [`close`](Self::close) when the underlying socket goes away. Dropping the
/// connection disconnects it too, on a best-effort basis; if the request
/// channel is full at that moment the registry sweeps it on the next connect.
pub struct Connection {
    id: ConnectionId,
    client: TrackingClient,
    frames: mpsc::UnboundedReceiver<Frame>,
    closed: bool,
}

impl Connection {
    pub(crate) fn new(
        id: ConnectionId,
        client: TrackingClient,
        frames: mpsc::UnboundedReceiver<Frame>,
    ) -> Self {
        Self {
            id,
            client,
            frames,
            closed: false,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Forwards raw channel text. Malformed text is dropped by the registry.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.client
            .send(TrackRequest::Text {
                connection: self.id,
                text: text.into(),
            })
            .await
    }

    pub async fn send(&self, message: ClientMessage) -> Result<(), ClientError> {
        self.client
            .send(TrackRequest::Message {
                connection: Some(self.id),
                message,
            })
            .await
    }

    pub async fn subscribe(&self, order_id: OrderId) -> Result<(), ClientError> {
        self.send(ClientMessage::Subscribe { order_id }).await
    }

    /// Next frame, or `None` once the registry has shut down or pruned us.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.frames.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Frame> {
        self.frames.try_recv().ok()
    }

    /// Next frame serialised for the wire.
    pub async fn recv_text(&mut self) -> Option<String> {
        loop {
            let frame = self.frames.recv().await?;
            match frame.to_json() {
                Ok(text) => return Some(text),
                Err(e) => warn!(connection = %self.id, error = %e, "Frame not serialisable"),
            }
        }
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.closed = true;
        self.client
            .send(TrackRequest::Disconnect { connection: self.id })
            .await
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.client.try_send(TrackRequest::Disconnect { connection: self.id }) {
            debug!(connection = %self.id, error = %e, "Disconnect on drop not delivered");
        }
    }
}
