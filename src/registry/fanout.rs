//! Connection table and frame routing.

use super::message::FrameSink;
use crate::config::FanoutMode;
use crate::model::{ConnectionId, Frame, OrderId};
use crate::player::TrackError;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Open connections plus the `order -> subscribers` table.
///
/// The subscription table is maintained in both modes; it only decides
/// delivery in [`FanoutMode::Subscribed`].
pub struct Fanout {
    mode: FanoutMode,
    connections: HashMap<ConnectionId, FrameSink>,
    subscriptions: HashMap<OrderId, BTreeSet<ConnectionId>>,
    next_id: u64,
}

impl Fanout {
    pub fn new(mode: FanoutMode) -> Self {
        Self {
            mode,
            connections: HashMap::new(),
            subscriptions: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn mode(&self) -> FanoutMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn connect(&mut self, sink: FrameSink) -> ConnectionId {
        self.prune_closed();
        let connection = ConnectionId::from(self.next_id);
        self.next_id += 1;
        self.connections.insert(connection, sink);
        info!(%connection, size = self.connections.len(), "Connected");
        connection
    }

    pub fn disconnect(&mut self, connection: ConnectionId) {
        if self.connections.remove(&connection).is_none() {
            return;
        }
        self.subscriptions.retain(|_, subscribers| {
            subscribers.remove(&connection);
            !subscribers.is_empty()
        });
        info!(%connection, size = self.connections.len(), "Disconnected");
    }

    /// Disconnects every connection whose receiving side is gone, whether or
    /// not anything was sent to it since.
    pub fn prune_closed(&mut self) {
        let closed: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|(_, sink)| sink.is_closed())
            .map(|(connection, _)| *connection)
            .collect();
        for connection in closed {
            debug!(%connection, "Pruning closed connection");
            self.disconnect(connection);
        }
    }

    pub fn subscribe(&mut self, connection: ConnectionId, order_id: &OrderId) {
        if !self.connections.contains_key(&connection) {
            return;
        }
        let added = self
            .subscriptions
            .entry(order_id.clone())
            .or_default()
            .insert(connection);
        if added {
            debug!(%connection, %order_id, "Subscribed");
        }
    }

    pub fn unsubscribe(&mut self, connection: ConnectionId, order_id: &OrderId) {
        if let Some(subscribers) = self.subscriptions.get_mut(order_id) {
            subscribers.remove(&connection);
            if subscribers.is_empty() {
                self.subscriptions.remove(order_id);
            }
            debug!(%connection, %order_id, "Unsubscribed");
        }
    }

    /// Drops every subscription to an order that no longer exists.
    pub fn forget_order(&mut self, order_id: &OrderId) {
        self.subscriptions.remove(order_id);
    }

    pub fn subscribers(&self, order_id: &OrderId) -> Vec<ConnectionId> {
        self.subscriptions
            .get(order_id)
            .map(|subscribers| subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Sends a frame to one connection; server-side callers pass `None`.
    pub fn reply(&mut self, connection: Option<ConnectionId>, frame: Frame) {
        if let Some(connection) = connection {
            self.deliver(connection, frame);
        }
    }

    /// Routes a player frame according to the fan-out mode.
    pub fn publish(&mut self, frame: &Frame) {
        let targets: Vec<ConnectionId> = match (self.mode, frame.order_id()) {
            (FanoutMode::Subscribed, Some(order_id)) => self.subscribers(order_id),
            _ => {
                let mut all: Vec<_> = self.connections.keys().copied().collect();
                all.sort();
                all
            }
        };
        for connection in targets {
            self.deliver(connection, frame.clone());
        }
    }

    fn deliver(&mut self, connection: ConnectionId, frame: Frame) {
        let Some(sink) = self.connections.get(&connection) else {
            return;
        };
        if sink.send(frame).is_err() {
            let err = TrackError::Transport {
                connection,
                reason: "receiver dropped".to_string(),
            };
            warn!(error = %err, "Pruning connection");
            self.disconnect(connection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn location(order: &str, index: usize) -> Frame {
        Frame::Location {
            order_id: order.into(),
            index,
            total: 10,
            position: crate::model::Waypoint::new(0.0, 0.0),
        }
    }

    #[test]
    fn test_broadcast_reaches_everyone() {
        let mut fanout = Fanout::new(FanoutMode::Broadcast);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        fanout.connect(tx_a);
        fanout.connect(tx_b);

        fanout.publish(&location("1", 0));
        assert_eq!(rx_a.try_recv().unwrap(), location("1", 0));
        assert_eq!(rx_b.try_recv().unwrap(), location("1", 0));
    }

    #[test]
    fn test_subscribed_mode_filters_by_order() {
        let mut fanout = Fanout::new(FanoutMode::Subscribed);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = fanout.connect(tx_a);
        let b = fanout.connect(tx_b);
        fanout.subscribe(a, &"1".into());
        fanout.subscribe(b, &"2".into());

        fanout.publish(&location("1", 0));
        fanout.publish(&location("2", 0));
        fanout.publish(&location("3", 0));

        assert_eq!(rx_a.try_recv().unwrap(), location("1", 0));
        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), location("2", 0));
        assert!(rx_b.try_recv().is_err());

        fanout.unsubscribe(a, &"1".into());
        fanout.publish(&location("1", 1));
        assert!(rx_a.try_recv().is_err());
    }

    #[test]
    fn test_dead_connection_is_pruned_without_affecting_others() {
        let mut fanout = Fanout::new(FanoutMode::Broadcast);
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        let dead = fanout.connect(tx_dead);
        fanout.connect(tx_live);
        fanout.subscribe(dead, &"1".into());
        drop(rx_dead);

        fanout.publish(&location("1", 0));
        fanout.publish(&location("1", 1));

        assert_eq!(fanout.len(), 1);
        assert!(fanout.subscribers(&"1".into()).is_empty());
        assert_eq!(rx_live.try_recv().unwrap(), location("1", 0));
        assert_eq!(rx_live.try_recv().unwrap(), location("1", 1));
    }

    #[test]
    fn test_idle_closed_connection_is_pruned() {
        let mut fanout = Fanout::new(FanoutMode::Subscribed);
        let (tx_idle, rx_idle) = mpsc::unbounded_channel();
        let (tx_next, _rx_next) = mpsc::unbounded_channel();
        let idle = fanout.connect(tx_idle);
        fanout.subscribe(idle, &"1".into());
        drop(rx_idle);

        // Nothing was ever sent to `idle`; the next connect sweeps it.
        fanout.connect(tx_next);
        assert_eq!(fanout.len(), 1);
        assert!(fanout.subscribers(&"1".into()).is_empty());
    }

    #[test]
    fn test_reply_only_reaches_requester() {
        let mut fanout = Fanout::new(FanoutMode::Broadcast);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = fanout.connect(tx_a);
        fanout.connect(tx_b);

        fanout.reply(Some(a), Frame::Pong);
        fanout.reply(None, Frame::Pong);
        assert_eq!(rx_a.try_recv().unwrap(), Frame::Pong);
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
    }
}
