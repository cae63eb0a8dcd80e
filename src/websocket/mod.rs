pub mod handler;
pub mod msg_key_handler;
pub mod msg_ping_handler;
pub mod msg_room_handler;
