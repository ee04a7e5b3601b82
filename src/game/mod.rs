//! Game module: grid rules, snakes and room simulation

pub mod bot;
pub mod collision;
pub mod direction;
pub mod food;
pub mod game_loop;
pub mod grid;
pub mod registry;
pub mod room;
pub mod snake;

pub use direction::Direction;
pub use grid::{Cell, Grid};
pub use registry::{RoomRegistry, SharedRoom};
pub use room::{GameStatus, Room};
pub use snake::Snake;
