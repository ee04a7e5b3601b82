//! Game configuration constants and runtime settings

use std::time::Duration;

use clap::Parser;

use crate::game::grid::Grid;

/// Board width in cells
pub const GRID_WIDTH: i32 = 30;

/// Board height in cells
pub const GRID_HEIGHT: i32 = 30;

/// Game tick delay in milliseconds
pub const TICK_DELAY_MS: u64 = 150;

/// Snapshot broadcast interval in milliseconds
pub const BROADCAST_INTERVAL_MS: u64 = 100;

/// Score awarded for each food eaten
pub const FOOD_REWARD: u32 = 10;

/// Players per room
pub const MAX_PLAYERS: usize = 2;

/// Distance of the starting cells from the left/right walls
pub const START_OFFSET: i32 = 5;

/// Player colors, indexed by slot - 1
pub const PLAYER_COLORS: [&str; MAX_PLAYERS] = ["#ff6b6b", "#4ecdc4"];

/// Random samples tried before food placement falls back to a scan
pub const FOOD_PLACEMENT_ATTEMPTS: usize = 100;

/// Per-room broadcast channel capacity
pub const BROADCAST_CAPACITY: usize = 64;

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Room codes longer than this are truncated
pub const MAX_ROOM_ID_LEN: usize = 32;

/// Player names longer than this are truncated
pub const MAX_PLAYER_NAME_LEN: usize = 24;

/// Display name given to practice bots
pub const BOT_NAME: &str = "Bot";

/// Command line / environment configuration for the server process
#[derive(Debug, Clone, Parser)]
#[command(name = "snake-duel")]
#[command(about = "Two-player Snake server", long_about = None)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Deployment environment reported by /health
    #[arg(long, env = "APP_ENV", default_value = "development")]
    pub environment: String,

    /// Board width in cells
    #[arg(long, default_value_t = GRID_WIDTH, value_parser = clap::value_parser!(i32).range(12..=200))]
    pub grid_width: i32,

    /// Board height in cells
    #[arg(long, default_value_t = GRID_HEIGHT, value_parser = clap::value_parser!(i32).range(3..=200))]
    pub grid_height: i32,

    /// Simulation tick interval in milliseconds
    #[arg(long, default_value_t = TICK_DELAY_MS)]
    pub tick_ms: u64,

    /// Snapshot broadcast interval in milliseconds
    #[arg(long, default_value_t = BROADCAST_INTERVAL_MS)]
    pub broadcast_ms: u64,

    /// Score awarded per food
    #[arg(long, default_value_t = FOOD_REWARD)]
    pub food_reward: u32,
}

impl ServerConfig {
    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Game settings shared by every room
    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            grid: Grid::new(self.grid_width, self.grid_height),
            food_reward: self.food_reward,
            tick_interval: Duration::from_millis(self.tick_ms.max(1)),
            broadcast_interval: Duration::from_millis(self.broadcast_ms.max(1)),
        }
    }
}

/// Immutable simulation settings, fixed at process start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub grid: Grid,
    pub food_reward: u32,
    pub tick_interval: Duration,
    pub broadcast_interval: Duration,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            grid: Grid::new(GRID_WIDTH, GRID_HEIGHT),
            food_reward: FOOD_REWARD,
            tick_interval: Duration::from_millis(TICK_DELAY_MS),
            broadcast_interval: Duration::from_millis(BROADCAST_INTERVAL_MS),
        }
    }
}
