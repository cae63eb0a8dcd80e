
use serde::{Deserialize, Serialize};

/// Key press/release as emitted by a client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyEventPayload {
    pub room_id: String,
    pub key_id: u32,
    pub user_id: String,
}

/// Key press/release as relayed to the members of a room.
/// `timestamp` is stamped by the relay: milliseconds since the Unix epoch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteKeyEvent {
    pub key_id: u32,
    pub user_id: String,
    pub timestamp: i64,
}

/// Events a client may send. Frames are JSON text tagged by event name:
/// `{"event": "join-room", "data": "jam1"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "join-room")]
    JoinRoom(String),
    #[serde(rename = "leave-room")]
    LeaveRoom(String),
    #[serde(rename = "piano-key-press")]
    PianoKeyPress(KeyEventPayload),
    #[serde(rename = "piano-key-release")]
    PianoKeyRelease(KeyEventPayload),
    #[serde(rename = "ping")]
    Ping(String),
}

/// Events the relay sends. `connect` is the handshake: it carries the
/// connection id assigned at establishment, which clients use as their
/// `userId` when emitting key events.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "connect")]
    Connect(String),
    #[serde(rename = "user-count")]
    UserCount(usize),
    #[serde(rename = "user-joined")]
    UserJoined(String),
    #[serde(rename = "user-left")]
    UserLeft(String),
    #[serde(rename = "remote-key-press")]
    RemoteKeyPress(RemoteKeyEvent),
    #[serde(rename = "remote-key-release")]
    RemoteKeyRelease(RemoteKeyEvent),
    #[serde(rename = "pong")]
    Pong(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_room_wire_shape() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"join-room","data":"jam1"}"#).unwrap();
        assert_eq!(event, ClientEvent::JoinRoom("jam1".to_string()));
    }

    #[test]
    fn key_press_payload_is_camel_case() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"piano-key-press","data":{"roomId":"jam1","keyId":40,"userId":"abc"}}"#,
        )
        .unwrap();
        let ClientEvent::PianoKeyPress(payload) = event else {
            panic!("wrong variant");
        };
        assert_eq!(payload.room_id, "jam1");
        assert_eq!(payload.key_id, 40);
        assert_eq!(payload.user_id, "abc");
    }

    #[test]
    fn relayed_key_event_serializes_camel_case() {
        let event = ServerEvent::RemoteKeyPress(RemoteKeyEvent {
            key_id: 40,
            user_id: "abc".to_string(),
            timestamp: 1_700_000_000_000,
        });
        let text = serde_json::to_string(&event).unwrap();
        assert_eq!(
            text,
            r#"{"event":"remote-key-press","data":{"keyId":40,"userId":"abc","timestamp":1700000000000}}"#
        );
    }

    #[test]
    fn user_count_is_a_bare_integer() {
        let text = serde_json::to_string(&ServerEvent::UserCount(2)).unwrap();
        assert_eq!(text, r#"{"event":"user-count","data":2}"#);
    }
}
