use chrono::Utc;
use tracing::debug;

use crate::models::{KeyEventPayload, RemoteKeyEvent, ServerEvent};
use crate::relay::{presence, RelayState};

/// Handle a piano-key-press event.
pub async fn handle_key_press(state: &RelayState, connection_id: &str, payload: &KeyEventPayload) {
    relay_key_event(state, connection_id, payload, ServerEvent::RemoteKeyPress).await;
}

/// Handle a piano-key-release event.
pub async fn handle_key_release(state: &RelayState, connection_id: &str, payload: &KeyEventPayload) {
    relay_key_event(state, connection_id, payload, ServerEvent::RemoteKeyRelease).await;
}

/// Relay a key event to everyone currently in the room, the sender
/// included. The relay stamps the timestamp and forwards the key as-is:
/// no dedup, no validation of the key id — musical interpretation is a
/// client concern.
async fn relay_key_event(
    state: &RelayState,
    connection_id: &str,
    payload: &KeyEventPayload,
    wrap: fn(RemoteKeyEvent) -> ServerEvent,
) {
    let inner = state.lock().await;

    // Only members of the room may play into it.
    if !inner.rooms.contains(&payload.room_id, connection_id) {
        debug!(connection_id, room_id = %payload.room_id, "Key event from non-member ignored");
        return;
    }

    let event = wrap(RemoteKeyEvent {
        key_id: payload.key_id,
        user_id: payload.user_id.clone(),
        timestamp: Utc::now().timestamp_millis(),
    });
    presence::broadcast_to_room(&inner, &payload.room_id, &event);
}
