//! Snake entity: one player's body, heading, liveness and score

use std::collections::VecDeque;

use super::direction::Direction;
use super::grid::Cell;
use crate::protocol::PlayerData;

/// A player's snake. Mutated only by the room simulation.
#[derive(Debug, Clone)]
pub struct Snake {
    /// Slot within the room (1 or 2)
    pub slot: u8,
    /// Display name
    pub name: String,
    /// Snake color (hex format)
    pub color: String,
    /// Driven by the in-process pursuit policy instead of a connection
    pub bot: bool,
    /// Current movement direction
    direction: Direction,
    /// Body segments (head is front, tail is back)
    body: VecDeque<Cell>,
    /// Whether the snake is alive
    alive: bool,
    score: u32,
}

impl Snake {
    /// Create a one-segment snake at `start`
    pub fn new(slot: u8, name: String, color: String, start: Cell, direction: Direction) -> Self {
        let mut body = VecDeque::new();
        body.push_front(start);

        Self {
            slot,
            name,
            color,
            bot: false,
            direction,
            body,
            alive: true,
            score: 0,
        }
    }

    /// Get the snake's head location
    pub fn head(&self) -> Cell {
        // The body is created non-empty and never shrinks below one segment.
        self.body[0]
    }

    /// Body segments, head first
    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Get the current direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Check if the snake is alive
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Set the snake's direction. 180-degree turns are ignored; returns whether
    /// the stored direction was replaced.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if self.direction.is_opposite(&new_direction) {
            return false;
        }
        self.direction = new_direction;
        true
    }

    /// Kill the snake. Its body stays where it is.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Commit a move to `new_head`. With `grow` the tail is kept.
    pub fn advance(&mut self, new_head: Cell, grow: bool) {
        if !self.alive {
            return;
        }

        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }

    pub fn add_score(&mut self, amount: u32) {
        self.score += amount;
    }

    /// Convert to PlayerData for protocol messages
    pub fn to_data(&self, id: String) -> PlayerData {
        PlayerData {
            id,
            name: self.name.clone(),
            number: self.slot,
            snake: self.body.iter().copied().collect(),
            direction: self.direction,
            color: self.color.clone(),
            score: self.score,
            alive: self.alive,
            bot: self.bot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake() -> Snake {
        Snake::new(1, "Alice".into(), "#ff6b6b".into(), Cell::new(5, 15), Direction::Right)
    }

    #[test]
    fn test_new_snake() {
        let snake = snake();
        assert!(snake.is_alive());
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Cell::new(5, 15));
        assert_eq!(snake.direction(), Direction::Right);
        assert_eq!(snake.score(), 0);
    }

    #[test]
    fn test_set_direction() {
        let mut snake = snake();

        // Should not reverse
        assert!(!snake.set_direction(Direction::Left));
        assert_eq!(snake.direction(), Direction::Right);

        // Can turn 90 degrees
        assert!(snake.set_direction(Direction::Up));
        assert_eq!(snake.direction(), Direction::Up);

        assert!(!snake.set_direction(Direction::Down));
        assert_eq!(snake.direction(), Direction::Up);
    }

    #[test]
    fn test_advance_and_grow() {
        let mut snake = snake();

        snake.advance(Cell::new(6, 15), true);
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.head(), Cell::new(6, 15));

        snake.advance(Cell::new(7, 15), false);
        assert_eq!(snake.len(), 2);
        assert_eq!(
            snake.body().iter().copied().collect::<Vec<_>>(),
            vec![Cell::new(7, 15), Cell::new(6, 15)]
        );
    }

    #[test]
    fn test_dead_snake_is_frozen() {
        let mut snake = snake();
        snake.kill();
        snake.advance(Cell::new(6, 15), false);

        assert!(!snake.is_alive());
        assert_eq!(snake.head(), Cell::new(5, 15));
    }
}
