//! # Track Registry
//!
//! The registry multiplexes every [`TrackPlayer`] behind one channel. It is an
//! actor: a single Tokio task owns the `order -> player` table and the
//! connection table, and processes [`TrackRequest`]s one at a time. No locks
//! are needed and no caller can touch a player directly, so a `start` and a
//! `stop` for the same order can never interleave.
//!
//! The same loop is the scheduler. Each iteration waits for either the next
//! request or the earliest player deadline, whichever comes first. Ticks for
//! busy orders therefore never hold up control messages for other orders.
//! Finished tracks keep answering `request-current` for a retention window and
//! are then evicted by the same loop.

pub mod fanout;
pub mod message;

pub use fanout::*;
pub use message::*;

use crate::clients::TrackingClient;
use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::model::{ClientMessage, ConnectionId, ControlAction, Frame, OrderId, Waypoint};
use crate::player::{TrackError, TrackPlayer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// How long the loop parks when no player is running. Only a placeholder for
/// the disabled sleep branch; requests wake the loop regardless.
const IDLE_PARK: Duration = Duration::from_secs(3600);

pub struct TrackRegistry {
    receiver: mpsc::Receiver<TrackRequest>,
    players: HashMap<OrderId, TrackPlayer>,
    fanout: Fanout,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    finished_retention: Duration,
}

impl TrackRegistry {
    /// Creates the registry and the client used to talk to it.
    ///
    /// The registry does nothing until [`run`](Self::run) is spawned.
    pub fn new(config: &TrackerConfig, clock: Arc<dyn Clock>) -> (Self, TrackingClient) {
        let (sender, receiver) = mpsc::channel(config.request_buffer.max(1));
        let registry = Self {
            receiver,
            players: HashMap::new(),
            fanout: Fanout::new(config.fanout),
            clock,
            tick_interval: config.tick_interval(),
            finished_retention: config.finished_retention(),
        };
        (registry, TrackingClient::new(sender))
    }

    /// Runs the message/scheduler loop until a shutdown request arrives or
    /// every client handle is dropped.
    pub async fn run(mut self) {
        info!(fanout = ?self.fanout.mode(), tick_ms = self.tick_interval.as_millis() as u64, "Registry started");

        loop {
            let deadline = self.next_deadline();
            let wake_at = deadline.unwrap_or_else(|| self.clock.now() + IDLE_PARK);

            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(TrackRequest::Shutdown) | None => break,
                    Some(request) => self.handle_request(request),
                },
                _ = self.clock.sleep_until(wake_at), if deadline.is_some() => self.fire_due(),
            }
        }

        info!(players = self.players.len(), connections = self.fanout.len(), "Shutdown");
    }

    /// Earliest tick or eviction due across all players.
    fn next_deadline(&self) -> Option<Instant> {
        self.players.values().filter_map(|player| self.deadline_of(player)).min()
    }

    fn deadline_of(&self, player: &TrackPlayer) -> Option<Instant> {
        player
            .next_deadline()
            .or_else(|| player.finished_at()?.checked_add(self.finished_retention))
    }

    /// Evicts expired finished players, then ticks every player whose
    /// deadline has passed, earliest first.
    fn fire_due(&mut self) {
        let now = self.clock.now();
        self.evict_finished(now);

        let mut due: Vec<(Instant, OrderId)> = self
            .players
            .iter()
            .filter_map(|(order_id, player)| {
                player
                    .next_deadline()
                    .filter(|deadline| *deadline <= now)
                    .map(|deadline| (deadline, order_id.clone()))
            })
            .collect();
        due.sort();

        for (_, order_id) in due {
            // The state is re-read here, not at scheduling time.
            let Some(player) = self.players.get_mut(&order_id) else {
                continue;
            };
            let Some(frame) = player.tick(now) else {
                continue;
            };
            match &frame {
                Frame::RouteFinished { .. } => info!(%order_id, "Route finished"),
                Frame::Location { index, total, .. } => debug!(%order_id, index, total, "Location"),
                _ => {}
            }
            self.fanout.publish(&frame);
        }
    }

    fn evict_finished(&mut self, now: Instant) {
        let retention = self.finished_retention;
        let expired: Vec<OrderId> = self
            .players
            .iter()
            .filter(|(_, player)| {
                player
                    .finished_at()
                    .and_then(|at| at.checked_add(retention))
                    .is_some_and(|expiry| expiry <= now)
            })
            .map(|(order_id, _)| order_id.clone())
            .collect();
        for order_id in expired {
            self.players.remove(&order_id);
            self.fanout.forget_order(&order_id);
            debug!(%order_id, size = self.players.len(), "Evicted finished track");
        }
    }

    fn handle_request(&mut self, request: TrackRequest) {
        match request {
            TrackRequest::Connect { sink, respond_to } => {
                let connection = self.fanout.connect(sink);
                let _ = respond_to.send(connection);
            }
            TrackRequest::Disconnect { connection } => self.fanout.disconnect(connection),
            TrackRequest::Text { connection, text } => match ClientMessage::parse(&text) {
                Ok(message) => self.handle_message(Some(connection), message),
                Err(e) => {
                    let err = TrackError::from(e);
                    warn!(%connection, error = %err, "Dropping message");
                }
            },
            TrackRequest::Message { connection, message } => self.handle_message(connection, message),
            TrackRequest::Snapshot { order_id, respond_to } => {
                let snapshot = self.players.get(&order_id).map(TrackPlayer::current_state);
                debug!(%order_id, found = snapshot.is_some(), "Snapshot");
                let _ = respond_to.send(snapshot);
            }
            TrackRequest::Stats { respond_to } => {
                let _ = respond_to.send(RegistryStats {
                    players: self.players.len(),
                    connections: self.fanout.len(),
                });
            }
            TrackRequest::Shutdown => {}
        }
    }

    fn handle_message(&mut self, connection: Option<ConnectionId>, message: ClientMessage) {
        debug!(?connection, ?message, "Message");
        match message {
            ClientMessage::Ping => self.fanout.reply(connection, Frame::Pong),
            ClientMessage::RequestCurrent { order_id } => {
                if let Some(connection) = connection {
                    self.fanout.subscribe(connection, &order_id);
                }
                let reply = match self.players.get(&order_id) {
                    Some(player) => Frame::current_state(order_id, player.current_state()),
                    None => Frame::NoTrack { order_id },
                };
                self.fanout.reply(connection, reply);
            }
            ClientMessage::StartTrack { order_id, points } => {
                self.start_track(connection, order_id, points)
            }
            ClientMessage::TrackControl { order_id, action } => self.control(order_id, action),
            ClientMessage::Subscribe { order_id } => {
                if let Some(connection) = connection {
                    self.fanout.subscribe(connection, &order_id);
                }
            }
            ClientMessage::Unsubscribe { order_id } => {
                if let Some(connection) = connection {
                    self.fanout.unsubscribe(connection, &order_id);
                }
            }
        }
    }

    fn start_track(
        &mut self,
        connection: Option<ConnectionId>,
        order_id: OrderId,
        points: Vec<Waypoint>,
    ) {
        if points.is_empty() {
            let err = TrackError::Configuration(order_id);
            warn!(error = %err, "Ignoring start-track");
            return;
        }
        if let Some(connection) = connection {
            self.fanout.subscribe(connection, &order_id);
        }

        let now = self.clock.now();
        let tick_interval = self.tick_interval;
        let player = self
            .players
            .entry(order_id.clone())
            .or_insert_with(|| TrackPlayer::new(order_id.clone(), tick_interval));
        match player.start(points, now) {
            Ok(()) => {
                let (index, total) = (player.index(), player.total());
                info!(%order_id, index, total, size = self.players.len(), "Track started");
            }
            Err(e) => warn!(%order_id, error = %e, "Start failed"),
        }
    }

    fn control(&mut self, order_id: OrderId, action: ControlAction) {
        let Some(player) = self.players.get_mut(&order_id) else {
            let err = TrackError::NotFound(order_id);
            debug!(?action, error = %err, "Control ignored");
            return;
        };

        let frame = match action {
            ControlAction::Pause => player.pause(),
            ControlAction::Resume => player.resume(self.clock.now()),
            ControlAction::Stop => {
                let frame = player.stop();
                self.players.remove(&order_id);
                frame
            }
        };

        if let Some(frame) = frame {
            info!(%order_id, ?action, "Control applied");
            self.fanout.publish(&frame);
        }
        if action == ControlAction::Stop {
            self.fanout.forget_order(&order_id);
        }
    }
}
