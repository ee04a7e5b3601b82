//! Snake Duel: two-player room-based Snake over WebSocket
//!
//! The game core (`game`) is transport-agnostic; `state::AppState` drives it on
//! behalf of the axum WebSocket adapter in `ws`.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod game;
pub mod health;
pub mod protocol;
pub mod state;
pub mod ws;

pub use error::GameError;
pub use state::AppState;
