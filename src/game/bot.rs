//! Pursuit policy for practice bots
//!
//! The bot only picks a direction; the room applies it through the same
//! direction-change path a remote player uses.

use super::collision;
use super::direction::Direction;
use super::grid::{Cell, Grid};
use super::snake::Snake;

/// Pick the next direction for `me`.
///
/// Heads toward the food along x first, then y. If neither of those moves is
/// legal and safe, falls back to the first of [`Direction::ALL`] that is not a
/// reversal and does not collide. Returns `None` when every move is fatal.
pub fn choose_direction(grid: &Grid, me: &Snake, others: &[&Snake], food: Cell) -> Option<Direction> {
    let head = me.head();
    let current = me.direction();

    let usable = |direction: Direction| {
        !current.is_opposite(&direction)
            && collision::detect(grid, me, head.step(direction), others.iter().copied()).is_none()
    };

    let mut toward_food = Vec::with_capacity(2);
    if food.x > head.x {
        toward_food.push(Direction::Right);
    } else if food.x < head.x {
        toward_food.push(Direction::Left);
    }
    if food.y > head.y {
        toward_food.push(Direction::Down);
    } else if food.y < head.y {
        toward_food.push(Direction::Up);
    }

    toward_food
        .into_iter()
        .find(|d| usable(*d))
        .or_else(|| Direction::ALL.into_iter().find(|d| usable(*d)))
}
