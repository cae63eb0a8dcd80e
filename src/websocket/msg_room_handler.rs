use tracing::info;

use crate::models::ServerEvent;
use crate::relay::{presence, RelayState};

/// Handle a join-room event.
///
/// A connection is a member of at most one room: joining while already
/// joined elsewhere first leaves the previous room, with the usual
/// presence broadcast to its remaining members. Rejoining the current
/// room is an idempotent add that still re-announces the joiner.
pub async fn handle_join_room(state: &RelayState, connection_id: &str, room_id: &str) {
    let mut inner = state.lock().await;

    if let Some(previous) = inner.registry.current_room(connection_id) {
        if previous != room_id {
            if let Some(user_count) = inner.rooms.leave(&previous, connection_id) {
                presence::broadcast_presence(
                    &inner,
                    &previous,
                    user_count,
                    ServerEvent::UserLeft(connection_id.to_string()),
                );
            }
        }
    }

    let user_count = inner.rooms.join(room_id, connection_id);
    inner
        .registry
        .set_room(connection_id, Some(room_id.to_string()));
    presence::broadcast_presence(
        &inner,
        room_id,
        user_count,
        ServerEvent::UserJoined(connection_id.to_string()),
    );

    info!(connection_id, room_id, user_count, "User joined room");
}

/// Handle a leave-room event.
///
/// Leaving a room the connection is not a member of — a double leave, a
/// stale leave after a disconnect, an unknown room — is a no-op: nothing
/// is emitted.
pub async fn handle_leave_room(state: &RelayState, connection_id: &str, room_id: &str) {
    let mut inner = state.lock().await;

    let Some(user_count) = inner.rooms.leave(room_id, connection_id) else {
        return;
    };
    if inner.registry.current_room(connection_id).as_deref() == Some(room_id) {
        inner.registry.set_room(connection_id, None);
    }
    presence::broadcast_presence(
        &inner,
        room_id,
        user_count,
        ServerEvent::UserLeft(connection_id.to_string()),
    );

    info!(connection_id, room_id, user_count, "User left room");
}
