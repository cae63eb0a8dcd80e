pub mod presence;
pub mod registry;
pub mod rooms;

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::models::ServerEvent;
use registry::{ConnectionRegistry, EventSender};
use rooms::RoomTable;

/// Shared relay state: who is connected, and which room each connection
/// is in.
///
/// Constructed once at process start and handed to the router as
/// application state. Handlers hold the lock for the whole
/// mutate-then-fanout sequence of one event, so room mutation and the
/// broadcast it triggers never interleave with another handler's.
pub struct RelayState {
    inner: Mutex<RelayInner>,
}

pub struct RelayInner {
    pub registry: ConnectionRegistry,
    pub rooms: RoomTable,
}

/// Counters for the diagnostics endpoint.
pub struct RelayStats {
    pub connections: u32,
    pub rooms: u32,
    pub joined: u32,
}

impl RelayState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RelayInner {
                registry: ConnectionRegistry::new(),
                rooms: RoomTable::new(),
            }),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, RelayInner> {
        self.inner.lock().await
    }

    /// Register a freshly established connection.
    pub async fn connect(&self, connection_id: &str, sender: EventSender) {
        let mut inner = self.inner.lock().await;
        inner.registry.register(connection_id, sender);
        info!(connection_id, "Client connected");
    }

    /// Tear down a connection. Called exactly once per connection, after
    /// its socket tasks have settled; if the connection was still joined
    /// to a room this doubles as its leave, with the same presence
    /// broadcast an explicit leave-room would have produced.
    pub async fn disconnect(&self, connection_id: &str) {
        let mut inner = self.inner.lock().await;
        match inner.registry.unregister(connection_id) {
            Some(room_id) => {
                if let Some(user_count) = inner.rooms.leave(&room_id, connection_id) {
                    presence::broadcast_presence(
                        &inner,
                        &room_id,
                        user_count,
                        ServerEvent::UserLeft(connection_id.to_string()),
                    );
                    info!(connection_id, %room_id, user_count, "Client disconnected, left room");
                } else {
                    // Tracked room no longer lists this member; nothing to
                    // remove, nothing to emit.
                    info!(connection_id, %room_id, "Client disconnected");
                }
            }
            None => {
                info!(connection_id, "Client disconnected");
            }
        }
    }

    pub async fn stats(&self) -> RelayStats {
        let inner = self.inner.lock().await;
        RelayStats {
            connections: inner.registry.connection_count() as u32,
            rooms: inner.rooms.room_count() as u32,
            joined: inner.registry.joined_count() as u32,
        }
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new()
    }
}
