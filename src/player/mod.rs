//! # Track Player
//!
//! One order's simulated vehicle. The player is a pure state machine: it holds
//! the route, a cursor and a tagged state, and returns the frames its
//! transitions produce. It never sleeps and never talks to the network; the
//! registry owns the single scheduler loop that calls [`TrackPlayer::tick`]
//! once a deadline is due, and fans the frames out.
//!
//! ```text
//!            start              pause
//!   Idle ──────────▶ Running ◀────────▶ Paused
//!                      │       resume
//!                      │ index >= total
//!                      ▼
//!                   Finished          (any) ── stop ──▶ Stopped
//! ```
//!
//! Cancellation is cooperative: `pause` and `stop` drop the pending deadline,
//! and `tick` re-checks the state before emitting anything, so a timer that
//! fires after a pause is a no-op.

pub mod error;

pub use error::*;

use crate::model::{Frame, OrderId, TrackSnapshot, Waypoint};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default cadence between two position frames.
///
/// Generous enough to survive high-latency tunnels between server and client.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Created but never started.
    Idle,
    /// Ticking; the next frame is due at `next_tick`.
    Running { next_tick: Instant },
    Paused,
    /// Every waypoint has been emitted and `route-finished` was sent at `at`.
    Finished { at: Instant },
    /// Terminal. The owner must discard the player.
    Stopped,
}

#[derive(Debug, Clone)]
pub struct TrackPlayer {
    order_id: OrderId,
    points: Vec<Waypoint>,
    index: usize,
    state: PlayerState,
    tick_interval: Duration,
}

impl TrackPlayer {
    pub fn new(order_id: OrderId, tick_interval: Duration) -> Self {
        Self {
            order_id,
            points: Vec::new(),
            index: 0,
            state: PlayerState::Idle,
            tick_interval,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.points.len()
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state == PlayerState::Stopped
    }

    /// When `route-finished` was emitted, if the route is done.
    pub fn finished_at(&self) -> Option<Instant> {
        match self.state {
            PlayerState::Finished { at } => Some(at),
            _ => None,
        }
    }

    /// When the next tick is due, if the player is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            PlayerState::Running { next_tick } => Some(next_tick),
            _ => None,
        }
    }

    /// Starts (or continues) playback over `points`.
    ///
    /// The cursor is never reset: a reconnecting client that re-sends the same
    /// route picks up where the vehicle already is. A player that is already
    /// running keeps its pending deadline so the cadence is not disturbed.
    ///
    /// A finished player only restarts if `points` reaches past the cursor;
    /// re-sending the route it already completed is rejected.
    pub fn start(&mut self, points: Vec<Waypoint>, now: Instant) -> Result<(), TrackError> {
        if points.is_empty() {
            return Err(TrackError::Configuration(self.order_id.clone()));
        }
        if self.is_stopped() {
            return Err(TrackError::Stopped(self.order_id.clone()));
        }
        if self.finished_at().is_some() && points.len() <= self.index {
            return Err(TrackError::Finished(self.order_id.clone()));
        }

        self.points = points;
        if !matches!(self.state, PlayerState::Running { .. }) {
            self.state = PlayerState::Running { next_tick: now };
        }
        debug!(order_id = %self.order_id, index = self.index, total = self.total(), "Started");
        Ok(())
    }

    /// Advances the vehicle by one waypoint if a tick is due.
    ///
    /// Non-finite waypoints are skipped without consuming an interval. Returns
    /// the frame to publish, or `None` if the player is not running or the
    /// deadline has not been reached.
    pub fn tick(&mut self, now: Instant) -> Option<Frame> {
        match self.state {
            PlayerState::Running { next_tick } if next_tick <= now => {}
            _ => return None,
        }

        while let Some(point) = self.points.get(self.index).copied() {
            if !point.is_finite() {
                let err = TrackError::InvalidWaypoint {
                    order_id: self.order_id.clone(),
                    index: self.index,
                };
                warn!(error = %err, "Skipping waypoint");
                self.index += 1;
                continue;
            }

            let frame = Frame::Location {
                order_id: self.order_id.clone(),
                index: self.index,
                total: self.total(),
                position: point,
            };
            self.index += 1;
            self.state = PlayerState::Running {
                next_tick: now + self.tick_interval,
            };
            return Some(frame);
        }

        self.state = PlayerState::Finished { at: now };
        debug!(order_id = %self.order_id, total = self.total(), "Finished");
        Some(Frame::RouteFinished {
            order_id: self.order_id.clone(),
        })
    }

    /// Running → Paused. Cancels the pending tick.
    pub fn pause(&mut self) -> Option<Frame> {
        if !matches!(self.state, PlayerState::Running { .. }) {
            return None;
        }
        self.state = PlayerState::Paused;
        Some(Frame::RoutePaused {
            order_id: self.order_id.clone(),
            index: self.index,
        })
    }

    /// Paused → Running, ticking again from the current index right away.
    pub fn resume(&mut self, now: Instant) -> Option<Frame> {
        if self.state != PlayerState::Paused {
            return None;
        }
        self.state = PlayerState::Running { next_tick: now };
        Some(Frame::RouteResumed {
            order_id: self.order_id.clone(),
        })
    }

    /// Any state → Stopped. Terminal.
    pub fn stop(&mut self) -> Option<Frame> {
        if self.is_stopped() {
            return None;
        }
        self.state = PlayerState::Stopped;
        Some(Frame::RouteStopped {
            order_id: self.order_id.clone(),
        })
    }

    /// Progress for state recovery. The position is clamped to the last point
    /// once the route is done, and `None` only if no route was ever given.
    pub fn current_state(&self) -> TrackSnapshot {
        let position = self
            .points
            .get(self.index)
            .or_else(|| self.points.last())
            .copied();
        TrackSnapshot {
            index: self.index,
            total: self.total(),
            position,
        }
    }
}
