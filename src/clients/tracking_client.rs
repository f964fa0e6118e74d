use super::{ClientError, Connection};
use crate::model::{ClientMessage, ConnectionId, ControlAction, OrderId, TrackSnapshot, Waypoint};
use crate::registry::{RegistryStats, TrackRequest};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// A cloneable handle for talking to the [`TrackRegistry`](crate::registry::TrackRegistry).
///
/// Holds only a sender, so cloning is cheap. When every clone is dropped the
/// registry loop exits.
#[derive(Clone)]
pub struct TrackingClient {
    sender: mpsc::Sender<TrackRequest>,
}

impl TrackingClient {
    pub fn new(sender: mpsc::Sender<TrackRequest>) -> Self {
        Self { sender }
    }

    pub(crate) async fn send(&self, request: TrackRequest) -> Result<(), ClientError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| ClientError::ActorClosed)
    }

    /// Non-blocking send for contexts that cannot await, such as `Drop`.
    pub(crate) fn try_send(&self, request: TrackRequest) -> Result<(), ClientError> {
        self.sender
            .try_send(request)
            .map_err(|_| ClientError::ActorClosed)
    }

    /// Opens a new observer connection on the channel.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<Connection, ClientError> {
        let (sink, frames) = mpsc::unbounded_channel();
        let (respond_to, response) = oneshot::channel();
        self.send(TrackRequest::Connect { sink, respond_to }).await?;
        let id = response.await.map_err(|_| ClientError::ActorDropped)?;
        debug!(connection = %id, "Connection opened");
        Ok(Connection::new(id, self.clone(), frames))
    }

    /// Starts or continues the simulated vehicle for an order.
    ///
    /// An empty route is logged and ignored by the registry.
    #[instrument(skip(self, points), fields(total = points.len()))]
    pub async fn start_track(&self, order_id: OrderId, points: Vec<Waypoint>) -> Result<(), ClientError> {
        debug!("Sending request");
        self.send(TrackRequest::Message {
            connection: None,
            message: ClientMessage::StartTrack { order_id, points },
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn control(&self, order_id: OrderId, action: ControlAction) -> Result<(), ClientError> {
        debug!("Sending request");
        self.send(TrackRequest::Message {
            connection: None,
            message: ClientMessage::TrackControl { order_id, action },
        })
        .await
    }

    pub async fn pause(&self, order_id: OrderId) -> Result<(), ClientError> {
        self.control(order_id, ControlAction::Pause).await
    }

    pub async fn resume(&self, order_id: OrderId) -> Result<(), ClientError> {
        self.control(order_id, ControlAction::Resume).await
    }

    pub async fn stop(&self, order_id: OrderId) -> Result<(), ClientError> {
        self.control(order_id, ControlAction::Stop).await
    }

    /// Subscribes an existing connection to an order's frames.
    pub async fn subscribe(&self, connection: ConnectionId, order_id: OrderId) -> Result<(), ClientError> {
        self.send(TrackRequest::Message {
            connection: Some(connection),
            message: ClientMessage::Subscribe { order_id },
        })
        .await
    }

    /// Asks the registry loop to exit. Open connections see their frame
    /// stream end.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.send(TrackRequest::Shutdown).await
    }

    /// Number of registered players and open connections.
    pub async fn stats(&self) -> Result<RegistryStats, ClientError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TrackRequest::Stats { respond_to }).await?;
        response.await.map_err(|_| ClientError::ActorDropped)
    }

    /// Progress of an order, or `None` if the registry holds no track for it.
    #[instrument(skip(self))]
    pub async fn current_state(&self, order_id: OrderId) -> Result<Option<TrackSnapshot>, ClientError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TrackRequest::Snapshot { order_id, respond_to }).await?;
        response.await.map_err(|_| ClientError::ActorDropped)
    }
}
