//! Collision detection logic

use std::fmt;

use super::grid::{Cell, Grid};
use super::snake::Snake;

/// Why a snake died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Head would leave the board
    Wall,
    /// Head would land on the snake's own body
    OwnBody,
    /// Head would land on another snake, living or dead
    OtherSnake,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collision::Wall => write!(f, "wall"),
            Collision::OwnBody => write!(f, "own body"),
            Collision::OtherSnake => write!(f, "other snake"),
        }
    }
}

/// Check the cell `mover` is about to move its head into.
///
/// Checks run in order: bounds, own body, then every other snake as it stands
/// right now (snakes that already moved this tick are checked at their new
/// position).
pub fn detect<'a>(
    grid: &Grid,
    mover: &Snake,
    new_head: Cell,
    others: impl IntoIterator<Item = &'a Snake>,
) -> Option<Collision> {
    if !grid.in_bounds(new_head) {
        return Some(Collision::Wall);
    }

    if mover.occupies(new_head) {
        return Some(Collision::OwnBody);
    }

    if others.into_iter().any(|other| other.occupies(new_head)) {
        return Some(Collision::OtherSnake);
    }

    None
}
