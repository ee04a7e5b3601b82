//! WebSocket transport

mod handler;

pub use handler::ws_handler;
