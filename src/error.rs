use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Missing room ID")]
    MissingRoomId,

    #[error("Missing player name")]
    MissingPlayerName,

    #[error("Room is full (max 2 players)")]
    RoomFull,

    #[error("Invalid direction: ({x}, {y})")]
    InvalidDirection { x: i32, y: i32 },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
