//! Room simulation: the authoritative state machine of one game room

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::bot;
use super::collision::{self, Collision};
use super::direction::Direction;
use super::food;
use super::grid::Cell;
use super::snake::Snake;
use crate::config::{GameSettings, BOT_NAME, MAX_PLAYERS, PLAYER_COLORS, START_OFFSET};
use crate::error::GameError;
use crate::protocol::{GameSnapshot, PlayerData};

/// Identifies one transport connection
pub type ConnectionId = Uuid;

/// Room lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    /// Fewer than two players, no ticking
    Waiting,
    /// Two players, tick driver running
    Playing,
    /// Ticking stopped, scores frozen
    GameOver,
}

#[derive(Debug)]
struct Seat {
    connection: ConnectionId,
    snake: Snake,
}

/// Result of a successful join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Joined {
    pub slot: u8,
    /// This join filled the room and moved it to `Playing`
    pub started: bool,
    /// The connection already held this seat
    pub rejoined: bool,
}

/// Result of removing a seated connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Left {
    pub slot: u8,
    /// The departure ended a running game
    pub ended_game: bool,
    /// No human remains; the room must be destroyed
    pub empty: bool,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Slots that ate the food
    pub eaten: Vec<u8>,
    /// Slots that died, with the cause
    pub deaths: Vec<(u8, Collision)>,
    /// The tick moved the room to `GameOver`
    pub game_over: bool,
}

pub struct Room {
    id: String,
    settings: GameSettings,
    /// Seats keyed by slot, so iteration follows slot order
    seats: BTreeMap<u8, Seat>,
    food: Cell,
    status: GameStatus,
    /// Bumped every time a game starts; a tick driver only serves its own round
    round: u64,
    ticks: u64,
    ticker: Option<AbortHandle>,
    closed: bool,
    rng: StdRng,
}

impl Room {
    pub fn new(id: impl Into<String>, settings: GameSettings) -> Self {
        Self::with_rng(id, settings, StdRng::from_entropy())
    }

    /// Create a room with a caller-supplied random source
    pub fn with_rng(id: impl Into<String>, settings: GameSettings, mut rng: StdRng) -> Self {
        let food = food::place(&settings.grid, &HashSet::new(), &mut rng).unwrap_or(Cell::new(0, 0));
        Self {
            id: id.into(),
            settings,
            seats: BTreeMap::new(),
            food,
            status: GameStatus::Waiting,
            round: 0,
            ticks: 0,
            ticker: None,
            closed: false,
            rng,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Ticks applied since the room was created
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// The room was emptied and is being removed from the registry
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn slot_of(&self, connection: &ConnectionId) -> Option<u8> {
        self.seats
            .iter()
            .find(|(_, seat)| seat.connection == *connection)
            .map(|(slot, _)| *slot)
    }

    pub fn snake(&self, connection: &ConnectionId) -> Option<&Snake> {
        self.seats
            .values()
            .find(|seat| seat.connection == *connection)
            .map(|seat| &seat.snake)
    }

    /// Snakes in slot order
    pub fn snakes(&self) -> impl Iterator<Item = &Snake> {
        self.seats.values().map(|seat| &seat.snake)
    }

    /// Seat a player.
    ///
    /// A finished room is reset to `Waiting` first. Joining again from a seated
    /// connection is a no-op that reports the existing slot.
    pub fn join(&mut self, connection: ConnectionId, name: String) -> Result<Joined, GameError> {
        if self.status == GameStatus::GameOver {
            self.reset();
        }

        if let Some(slot) = self.slot_of(&connection) {
            return Ok(Joined {
                slot,
                started: false,
                rejoined: true,
            });
        }

        let slot = (1..=MAX_PLAYERS as u8)
            .find(|slot| !self.seats.contains_key(slot))
            .ok_or(GameError::RoomFull)?;

        let grid = self.settings.grid;
        let (start, direction) = if slot == 1 {
            (Cell::new(START_OFFSET, grid.height / 2), Direction::Right)
        } else {
            (Cell::new(grid.width - START_OFFSET, grid.height / 2), Direction::Left)
        };
        let color = PLAYER_COLORS[usize::from(slot - 1)].to_string();

        let snake = Snake::new(slot, name, color, start, direction);
        self.seats.insert(slot, Seat { connection, snake });

        if self.food == start {
            self.respawn_food();
        }

        let started = self.seats.len() == MAX_PLAYERS;
        if started {
            self.start();
        }

        Ok(Joined {
            slot,
            started,
            rejoined: false,
        })
    }

    /// Seat an in-process bot in the next free slot
    pub fn add_bot(&mut self) -> Result<Joined, GameError> {
        let connection = Uuid::new_v4();
        let joined = self.join(connection, BOT_NAME.to_string())?;
        if let Some(seat) = self.seats.get_mut(&joined.slot) {
            seat.snake.bot = true;
        }
        Ok(joined)
    }

    pub fn has_bot(&self) -> bool {
        self.snakes().any(|snake| snake.bot)
    }

    /// Remove a connection's snake. Returns `None` if it held no seat.
    ///
    /// Leaving a running game ends it. When no human remains, bots are removed
    /// as well, the tick driver is stopped and the room is marked closed.
    pub fn leave(&mut self, connection: &ConnectionId) -> Option<Left> {
        let slot = self.slot_of(connection)?;
        self.seats.remove(&slot);

        if self.snakes().all(|snake| snake.bot) {
            self.seats.clear();
        }

        if self.seats.is_empty() {
            self.stop_ticker();
            self.closed = true;
            return Some(Left {
                slot,
                ended_game: false,
                empty: true,
            });
        }

        let ended_game = self.status == GameStatus::Playing;
        if ended_game {
            self.stop_ticker();
            self.finish();
        }

        Some(Left {
            slot,
            ended_game,
            empty: false,
        })
    }

    /// Queue a new heading for the next tick.
    ///
    /// Unknown or dead players and 180-degree reversals are ignored. Returns
    /// whether the stored direction changed.
    pub fn change_direction(&mut self, connection: &ConnectionId, direction: Direction) -> bool {
        match self
            .seats
            .values_mut()
            .find(|seat| seat.connection == *connection)
        {
            Some(seat) if seat.snake.is_alive() => seat.snake.set_direction(direction),
            _ => false,
        }
    }

    /// Let every living bot pick its heading for the coming tick
    pub fn steer_bots(&mut self) {
        let mut decisions = Vec::new();
        for seat in self.seats.values().filter(|s| s.snake.bot && s.snake.is_alive()) {
            let others: Vec<&Snake> = self
                .seats
                .values()
                .filter(|other| other.connection != seat.connection)
                .map(|other| &other.snake)
                .collect();
            if let Some(direction) = bot::choose_direction(&self.settings.grid, &seat.snake, &others, self.food) {
                decisions.push((seat.connection, direction));
            }
        }

        for (connection, direction) in decisions {
            self.change_direction(&connection, direction);
        }
    }

    /// Advance the simulation by one step. Does nothing unless `Playing`.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.status != GameStatus::Playing {
            return report;
        }
        self.ticks += 1;

        // Eating is judged against the food as it was when the tick began
        let food = self.food;
        let slots: Vec<u8> = self.seats.keys().copied().collect();
        for slot in slots {
            let (new_head, collision) = {
                let Some(seat) = self.seats.get(&slot) else {
                    continue;
                };
                if !seat.snake.is_alive() {
                    continue;
                }
                let new_head = seat.snake.head().step(seat.snake.direction());
                let others = self
                    .seats
                    .iter()
                    .filter(|(other, _)| **other != slot)
                    .map(|(_, other)| &other.snake);
                (
                    new_head,
                    collision::detect(&self.settings.grid, &seat.snake, new_head, others),
                )
            };

            let ate = new_head == food;
            let Some(seat) = self.seats.get_mut(&slot) else {
                continue;
            };

            if let Some(cause) = collision {
                seat.snake.kill();
                debug!("[{}] slot {} died: {}", self.id, slot, cause);
                report.deaths.push((slot, cause));
                continue;
            }

            seat.snake.advance(new_head, ate);
            if ate {
                seat.snake.add_score(self.settings.food_reward);
                debug!(
                    "[{}] slot {} ate food at ({}, {}). Score: {}",
                    self.id,
                    slot,
                    new_head.x,
                    new_head.y,
                    seat.snake.score()
                );
                report.eaten.push(slot);
            }
        }

        // Placed once every snake has moved, so it avoids all final segments
        if !report.eaten.is_empty() {
            self.respawn_food();
        }

        let alive = self.snakes().filter(|snake| snake.is_alive()).count();
        if alive <= 1 {
            // The driver sees `game_over` and exits after publishing the final
            // state, so its handle is released rather than aborted.
            self.ticker = None;
            self.finish();
            report.game_over = true;
        }

        report
    }

    /// Slot of the single survivor of a finished game
    pub fn winner(&self) -> Option<u8> {
        if self.status != GameStatus::GameOver {
            return None;
        }
        let mut alive = self.snakes().filter(|snake| snake.is_alive());
        match (alive.next(), alive.next()) {
            (Some(snake), None) => Some(snake.slot),
            _ => None,
        }
    }

    /// Public state of every seated player, in slot order
    pub fn player_list(&self) -> Vec<PlayerData> {
        self.seats
            .values()
            .map(|seat| seat.snake.to_data(seat.connection.to_string()))
            .collect()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.player_list(),
            food: self.food,
            game_state: self.status,
            winner: self.winner(),
        }
    }

    /// Move the food to a given free cell. Returns false if the cell is off
    /// the board or under a snake.
    pub fn set_food(&mut self, cell: Cell) -> bool {
        if !self.settings.grid.in_bounds(cell) || self.snakes().any(|snake| snake.occupies(cell)) {
            return false;
        }
        self.food = cell;
        true
    }

    /// Register the task driving this room's ticks
    pub fn attach_ticker(&mut self, handle: AbortHandle) {
        self.stop_ticker();
        self.ticker = Some(handle);
    }

    pub fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn start(&mut self) {
        self.status = GameStatus::Playing;
        self.round += 1;
        info!("[{}] game started (round {})", self.id, self.round);
    }

    fn finish(&mut self) {
        self.status = GameStatus::GameOver;

        let scores: Vec<String> = self
            .snakes()
            .map(|snake| format!("{}={}", snake.name, snake.score()))
            .collect();
        info!(
            "[{}] game over after {} ticks, winner: {:?}, scores: {}",
            self.id,
            self.ticks,
            self.winner(),
            scores.join(", ")
        );
    }

    fn reset(&mut self) {
        self.stop_ticker();
        self.seats.clear();
        self.status = GameStatus::Waiting;
        self.respawn_food();
        info!("[{}] reset for a new round", self.id);
    }

    fn respawn_food(&mut self) {
        let occupied: HashSet<Cell> = self
            .snakes()
            .flat_map(|snake| snake.body().iter().copied())
            .collect();
        match food::place(&self.settings.grid, &occupied, &mut self.rng) {
            Some(cell) => self.food = cell,
            None => warn!("[{}] board is full, food left in place", self.id),
        }
    }
}

impl Drop for Room {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
