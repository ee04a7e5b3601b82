//! Direction enum for snake movement

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Direction of movement, one of the four grid unit vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "DirectionVector", try_from = "DirectionVector")]
pub enum Direction {
    /// Moving up (-y)
    Up,
    /// Moving down (+y)
    Down,
    /// Moving left (-x)
    Left,
    /// Moving right (+x)
    Right,
}

/// Wire form of a direction: `{"x": dx, "y": dy}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionVector {
    pub x: i32,
    pub y: i32,
}

impl Direction {
    /// Probe order used when a direction has to be picked without preference
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector `(dx, dy)` of this direction
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Parse a unit vector; anything else is rejected
    pub fn from_delta(x: i32, y: i32) -> Option<Self> {
        match (x, y) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    /// The 180-degree reversal of this direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Check if this direction is opposite to another
    pub fn is_opposite(&self, other: &Direction) -> bool {
        self.opposite() == *other
    }
}

impl From<Direction> for DirectionVector {
    fn from(direction: Direction) -> Self {
        let (x, y) = direction.delta();
        Self { x, y }
    }
}

impl TryFrom<DirectionVector> for Direction {
    type Error = GameError;

    fn try_from(v: DirectionVector) -> Result<Self, Self::Error> {
        Direction::from_delta(v.x, v.y).ok_or(GameError::InvalidDirection { x: v.x, y: v.y })
    }
}
