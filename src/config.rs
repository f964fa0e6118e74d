//! Runtime settings for the tracking system.
//!
//! Every field has a default, so `TrackerConfig::default()` is a working
//! configuration. Values can be read from a JSON document or overlaid from
//! `TRACKER_*` environment variables.

use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::player::DEFAULT_TICK_INTERVAL;

/// How the registry routes frames to connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanoutMode {
    /// Every connection receives every order's frames and filters client-side.
    /// Wire compatible with clients that never subscribe.
    #[default]
    Broadcast,
    /// Frames go only to connections subscribed to the order.
    Subscribed,
}

impl std::str::FromStr for FanoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "broadcast" => Ok(FanoutMode::Broadcast),
            "subscribed" => Ok(FanoutMode::Subscribed),
            other => Err(format!("unknown fanout mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Delay between two position frames of one player.
    pub tick_interval_ms: u64,
    /// Capacity of the registry's request channel.
    pub request_buffer: usize,
    pub fanout: FanoutMode,
    /// Assumed vehicle speed for ETA estimates, meters per second.
    pub speed_mps: f64,
    /// How long a finished track still answers `request-current` before it
    /// is evicted.
    pub finished_retention_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            request_buffer: 32,
            fanout: FanoutMode::Broadcast,
            speed_mps: 10.0,
            finished_retention_ms: 5 * 60 * 1000,
        }
    }
}

impl TrackerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn finished_retention(&self) -> Duration {
        Duration::from_millis(self.finished_retention_ms)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Defaults overlaid with `TRACKER_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by key. Unparseable values are logged and skipped.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ms) = parse_var(&lookup, "TRACKER_TICK_INTERVAL_MS") {
            if ms == 0 {
                warn!(key = "TRACKER_TICK_INTERVAL_MS", "Ignoring zero tick interval");
            } else {
                self.tick_interval_ms = ms;
            }
        }
        if let Some(buffer) = parse_var::<usize>(&lookup, "TRACKER_REQUEST_BUFFER") {
            self.request_buffer = buffer.max(1);
        }
        if let Some(fanout) = parse_var(&lookup, "TRACKER_FANOUT") {
            self.fanout = fanout;
        }
        if let Some(speed) = parse_var(&lookup, "TRACKER_SPEED_MPS") {
            self.speed_mps = speed;
        }
        if let Some(ms) = parse_var(&lookup, "TRACKER_FINISHED_RETENTION_MS") {
            self.finished_retention_ms = ms;
        }
        self
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring invalid setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(1200));
        assert_eq!(config.fanout, FanoutMode::Broadcast);
        assert_eq!(config.request_buffer, 32);
        assert_eq!(config.finished_retention(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_json() {
        let config = TrackerConfig::from_json(r#"{"fanout": "subscribed", "tick_interval_ms": 500}"#).unwrap();
        assert_eq!(config.fanout, FanoutMode::Subscribed);
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.speed_mps, 10.0);
    }

    #[test]
    fn test_overrides_skip_invalid_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TRACKER_TICK_INTERVAL_MS", "250"),
            ("TRACKER_FANOUT", "everyone"),
            ("TRACKER_SPEED_MPS", "fast"),
            ("TRACKER_REQUEST_BUFFER", "0"),
            ("TRACKER_FINISHED_RETENTION_MS", "0"),
        ]);
        let config = TrackerConfig::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.fanout, FanoutMode::Broadcast);
        assert_eq!(config.speed_mps, 10.0);
        assert_eq!(config.request_buffer, 1);
        assert_eq!(config.finished_retention_ms, 0);
    }
}
