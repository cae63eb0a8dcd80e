use tracing::debug;

use super::RelayInner;
use crate::models::ServerEvent;

/// Send one event to every current member of a room.
///
/// Membership is read at emit time, never buffered: a connection that is
/// not subscribed at this instant does not receive the event. A member
/// whose receiving task already went away is skipped.
pub fn broadcast_to_room(inner: &RelayInner, room_id: &str, event: &ServerEvent) {
    for member in inner.rooms.members(room_id) {
        if let Some(sender) = inner.registry.sender(&member) {
            if sender.send(event.clone()).is_err() {
                debug!(connection_id = %member, room_id, "Dropping event for closed connection");
            }
        }
    }
}

/// Emit a membership change to a room: the post-mutation member count
/// first, then the join/leave notification, matching the order clients
/// rely on for their population display.
pub fn broadcast_presence(inner: &RelayInner, room_id: &str, user_count: usize, notice: ServerEvent) {
    broadcast_to_room(inner, room_id, &ServerEvent::UserCount(user_count));
    broadcast_to_room(inner, room_id, &notice);
}
