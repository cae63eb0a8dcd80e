use tracing::{debug, error};

use crate::models::ServerEvent;
use crate::relay::registry::EventSender;

/// Fixed acknowledgment sent for every ping.
const PONG_ACK: &str = "Pong from server!";

/// Handle a ping event: reply with a pong on the sender's own channel,
/// never broadcast.
pub fn handle_ping(sender: &EventSender, connection_id: &str, payload: &str) {
    debug!(connection_id, payload, "Ping received");
    if sender.send(ServerEvent::Pong(PONG_ACK.to_string())).is_err() {
        error!(connection_id, "Failed to send pong");
    }
}
