use std::collections::{HashMap, HashSet};

/// Room membership sets, keyed by caller-supplied room id.
///
/// A room exists only while it has at least one member: it is created on
/// the first join and deleted when the last member leaves, so a rejoined
/// id starts from a fresh, empty set.
#[derive(Default)]
pub struct RoomTable {
    rooms: HashMap<String, HashSet<String>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Add a connection to a room, creating the room if absent.
    /// Idempotent. Returns the member count after the add.
    pub fn join(&mut self, room_id: &str, connection_id: &str) -> usize {
        let members = self.rooms.entry(room_id.to_string()).or_default();
        members.insert(connection_id.to_string());
        members.len()
    }

    /// Remove a connection from a room, deleting the room when it empties.
    /// Returns the member count after the removal, or `None` when the room
    /// did not contain this member.
    pub fn leave(&mut self, room_id: &str, connection_id: &str) -> Option<usize> {
        let members = self.rooms.get_mut(room_id)?;
        if !members.remove(connection_id) {
            return None;
        }
        let count = members.len();
        if count == 0 {
            self.rooms.remove(room_id);
        }
        Some(count)
    }

    /// Current member count, 0 if the room is absent.
    pub fn size(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, |members| members.len())
    }

    pub fn contains(&self, room_id: &str, connection_id: &str) -> bool {
        self.rooms
            .get(room_id)
            .map_or(false, |members| members.contains(connection_id))
    }

    /// Snapshot of the current members of a room.
    pub fn members(&self, room_id: &str) -> Vec<String> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
