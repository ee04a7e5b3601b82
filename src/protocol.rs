//! Protocol messages for WebSocket communication
//!
//! Every frame is a JSON object tagged by `"type"`, with camelCase fields.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::direction::{Direction, DirectionVector};
use crate::game::grid::Cell;
use crate::game::room::GameStatus;

/// Who fills the second seat of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opponent {
    /// Wait for another connection to join
    #[default]
    Human,
    /// Seat an in-process bot right away
    Bot,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join (or create) a room
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        player_name: Option<String>,
        #[serde(default)]
        opponent: Opponent,
    },
    /// Direction change command
    ChangeDirection { direction: DirectionVector },
    /// Leave the current room but keep the connection
    LeaveRoom,
    /// Keepalive
    Ping,
}

impl ClientMessage {
    /// Parse a client message from a text frame
    pub fn parse(s: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(s.trim())?)
    }
}

/// Trim a client-supplied field and cap its length. Blank input yields `None`.
pub fn clean_field(value: Option<&str>, max_chars: usize) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_chars).collect())
}

/// Public state of one player
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerData {
    pub id: String,
    pub name: String,
    /// Slot (1 or 2)
    pub number: u8,
    /// Body segments, head first
    pub snake: Vec<Cell>,
    pub direction: Direction,
    pub color: String,
    pub score: u32,
    pub alive: bool,
    pub bot: bool,
}

/// Read-only projection of a room
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Players in slot order
    pub players: Vec<PlayerData>,
    pub food: Cell,
    pub game_state: GameStatus,
    /// Slot of the sole survivor once the game is over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<u8>,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Membership grew
    #[serde(rename_all = "camelCase")]
    PlayerJoined {
        players: Vec<PlayerData>,
        player_count: usize,
    },
    /// Membership shrank
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        players: Vec<PlayerData>,
        player_count: usize,
    },
    /// Join refused, room already has two players
    RoomFull,
    /// Room snapshot
    GameState(GameSnapshot),
    /// Request could not be served
    Error { message: String },
    /// Reply to ping
    Pong,
}

impl ServerMessage {
    /// Serialize message to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Error reply for a refused request
    pub fn from_error(err: &GameError) -> Self {
        match err {
            GameError::RoomFull => ServerMessage::RoomFull,
            other => ServerMessage::Error {
                message: other.to_string(),
            },
        }
    }
}
