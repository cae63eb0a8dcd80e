use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for diagnostics information
#[derive(Serialize, Deserialize, ToSchema)]
pub struct DiagnosticsResponse {
    /// Live connections, joined to a room or not
    pub n_conn: u32,
    /// Rooms with at least one member
    pub n_rooms: u32,
    /// Connections currently joined to a room
    pub n_joined: u32,
    pub cpu_usage: f32,
    pub memory_alloc: u64,
    pub memory_total: u64,
    pub memory_free: u64,
}
