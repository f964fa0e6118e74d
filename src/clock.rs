//! Time source injected into the tracking core.
//!
//! Tick scheduling reads a monotonic [`Instant`]; delivery timestamps and ETA
//! rendering read wall-clock [`SystemTime`]. Both go through [`Clock`] so tests
//! can run on Tokio's paused virtual time and still get reproducible
//! timestamps.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::Instant;

#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Monotonic time used for tick deadlines.
    fn now(&self) -> Instant;

    /// Wall-clock time used for timestamps.
    fn system_time(&self) -> SystemTime;

    /// Suspends until `deadline`.
    async fn sleep_until(&self, deadline: Instant);
}

/// Production clock backed by Tokio timers and the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl TokioClock {
    pub fn shared() -> Arc<dyn Clock> {
        Arc::new(Self)
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}

/// Clock whose wall-clock reading is derived from Tokio's (possibly paused)
/// monotonic clock, anchored at a fixed epoch.
///
/// With `#[tokio::test(start_paused = true)]` every reading is deterministic.
#[derive(Debug, Clone, Copy)]
pub struct VirtualClock {
    origin: Instant,
    epoch: SystemTime,
}

impl VirtualClock {
    pub fn new(epoch: SystemTime) -> Self {
        Self {
            origin: Instant::now(),
            epoch,
        }
    }

    /// Anchored at `UNIX_EPOCH + secs`.
    pub fn at_unix(secs: u64) -> Self {
        Self::new(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    pub fn shared(self) -> Arc<dyn Clock> {
        Arc::new(self)
    }
}

#[async_trait]
impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        self.epoch + self.origin.elapsed()
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}
