//! Inbound messages a client sends over the tracking channel.

use super::{OrderId, Waypoint};
use serde::{Deserialize, Serialize};

/// Control/subscription messages, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Keep-alive for intermediaries with idle timeouts.
    Ping,
    /// State-recovery query from a (re)connecting client.
    RequestCurrent { order_id: OrderId },
    StartTrack {
        order_id: OrderId,
        #[serde(default)]
        points: Vec<Waypoint>,
    },
    TrackControl {
        order_id: OrderId,
        action: ControlAction,
    },
    Subscribe { order_id: OrderId },
    Unsubscribe { order_id: OrderId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Pause,
    Resume,
    Stop,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_control_messages() {
        let msg = ClientMessage::parse(r#"{"type":"track-control","orderId":"5","action":"pause"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::TrackControl { order_id: "5".into(), action: ControlAction::Pause }
        );

        let msg = ClientMessage::parse(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);
    }

    #[test]
    fn test_start_track_without_points_is_empty() {
        let msg = ClientMessage::parse(r#"{"type":"start-track","orderId":12}"#).unwrap();
        assert_eq!(msg, ClientMessage::StartTrack { order_id: "12".into(), points: vec![] });
    }

    #[test]
    fn test_rejects_unknown_type_and_action() {
        assert!(ClientMessage::parse(r#"{"type":"teleport","orderId":"1"}"#).is_err());
        assert!(ClientMessage::parse(r#"{"type":"track-control","orderId":"1","action":"rewind"}"#).is_err());
        assert!(ClientMessage::parse("not json").is_err());
    }
}
