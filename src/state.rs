//! Application state shared across all handlers
//!
//! `AppState` is the seam between the WebSocket transport and the game core:
//! it resolves rooms, applies intents under each room's lock and fans the
//! resulting notifications out through the broadcaster.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::broadcast::{BroadcastReceiver, Broadcaster, InMemoryBroadcaster};
use crate::config::{GameSettings, MAX_PLAYER_NAME_LEN, MAX_ROOM_ID_LEN};
use crate::error::GameError;
use crate::game::direction::Direction;
use crate::game::game_loop::spawn_ticker;
use crate::game::registry::RoomRegistry;
use crate::game::room::ConnectionId;
use crate::protocol::{clean_field, GameSnapshot, Opponent, ServerMessage};

/// A validated join request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub room_id: String,
    pub player_name: String,
    pub opponent: Opponent,
}

impl JoinRequest {
    /// Validate raw client fields
    pub fn new(
        room_id: Option<&str>,
        player_name: Option<&str>,
        opponent: Opponent,
    ) -> Result<Self, GameError> {
        let room_id = clean_field(room_id, MAX_ROOM_ID_LEN).ok_or(GameError::MissingRoomId)?;
        let player_name =
            clean_field(player_name, MAX_PLAYER_NAME_LEN).ok_or(GameError::MissingPlayerName)?;
        Ok(Self {
            room_id,
            player_name,
            opponent,
        })
    }
}

/// What a connection gets back from a successful join
pub struct JoinAccepted {
    pub room_id: String,
    pub slot: u8,
    /// Subscription to the room's broadcasts, taken before `playerJoined` went out
    pub receiver: BroadcastReceiver,
    /// State to send to the joiner right away
    pub snapshot: GameSnapshot,
}

/// Shared application state
pub struct AppState {
    /// All live rooms
    pub registry: Arc<RoomRegistry>,
    /// Broadcaster for sending messages to room observers
    pub broadcaster: Arc<dyn Broadcaster>,
    /// Reported by the health endpoint
    pub environment: String,
    started_at: Instant,
}

impl AppState {
    /// Create a new application state with in-memory broadcasting
    pub fn new(settings: GameSettings) -> Self {
        Self::with_broadcaster(settings, Arc::new(InMemoryBroadcaster::new()))
    }

    /// Create with a custom broadcaster
    pub fn with_broadcaster(settings: GameSettings, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            registry: Arc::new(RoomRegistry::new(settings)),
            broadcaster,
            environment: "development".to_string(),
            started_at: Instant::now(),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn settings(&self) -> &GameSettings {
        self.registry.settings()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Get the number of live rooms
    pub fn room_count(&self) -> usize {
        self.registry.len()
    }

    /// Seat `connection` in the requested room.
    ///
    /// On success every observer of the room (the joiner included) receives
    /// `playerJoined`, and the tick driver is started if the room just filled.
    pub async fn join(
        &self,
        connection: ConnectionId,
        request: JoinRequest,
    ) -> Result<JoinAccepted, GameError> {
        let JoinRequest {
            room_id,
            player_name,
            opponent,
        } = request;

        loop {
            let shared = self.registry.resolve(&room_id);
            let mut room = shared.lock().await;
            if room.is_closed() {
                // Lost a race with the last player leaving; the registry
                // already dropped this room, so resolve again.
                continue;
            }

            let joined = match room.join(connection, player_name.clone()) {
                Ok(joined) => joined,
                Err(e) => {
                    info!("Join to room {} by {} refused: {}", room_id, player_name, e);
                    return Err(e);
                }
            };
            info!(
                "Player {} ({}) joined room {} as slot {}",
                player_name, connection, room_id, joined.slot
            );

            if opponent == Opponent::Bot && room.player_count() == 1 {
                let bot = room.add_bot()?;
                info!("Bot joined room {} as slot {}", room_id, bot.slot);
            }

            let receiver = self.broadcaster.subscribe(&room_id);
            let players = room.player_list();
            let player_count = players.len();
            self.broadcaster
                .send(
                    &room_id,
                    ServerMessage::PlayerJoined {
                        players,
                        player_count,
                    },
                )
                .await;

            if room.is_playing() && !room.has_ticker() {
                let handle = spawn_ticker(
                    shared.clone(),
                    self.broadcaster.clone(),
                    room.round(),
                    self.settings().tick_interval,
                );
                room.attach_ticker(handle);
                info!(
                    "Game started in room {} (tick every {}ms)",
                    room_id,
                    self.settings().tick_interval.as_millis()
                );
            }

            return Ok(JoinAccepted {
                room_id: room_id.clone(),
                slot: joined.slot,
                receiver,
                snapshot: room.snapshot(),
            });
        }
    }

    /// Remove `connection` from `room_id`. Unknown rooms and unseated
    /// connections are ignored.
    pub async fn leave(&self, connection: ConnectionId, room_id: &str) {
        let Some(shared) = self.registry.get(room_id) else {
            return;
        };
        let mut room = shared.lock().await;
        let Some(left) = room.leave(&connection) else {
            return;
        };
        info!(
            "Player {} left room {} (slot {}, {} remaining)",
            connection,
            room_id,
            left.slot,
            room.player_count()
        );

        if left.empty {
            // Still under the room lock: close the channel before unmapping so
            // a room recreated under this code starts with a fresh channel.
            self.broadcaster.close(room_id);
            self.registry.remove(room_id, &shared);
            return;
        }

        let players = room.player_list();
        let player_count = players.len();
        self.broadcaster
            .send(
                room_id,
                ServerMessage::PlayerLeft {
                    players,
                    player_count,
                },
            )
            .await;

        if left.ended_game {
            self.broadcaster
                .send(room_id, ServerMessage::GameState(room.snapshot()))
                .await;
        }
    }

    /// Apply a direction change. Stale or illegal input is silently dropped.
    pub async fn change_direction(
        &self,
        connection: ConnectionId,
        room_id: &str,
        direction: Direction,
    ) {
        let Some(shared) = self.registry.get(room_id) else {
            return;
        };
        let changed = shared.lock().await.change_direction(&connection, direction);
        debug!(
            "Direction {:?} from {} in room {}: {}",
            direction,
            connection,
            room_id,
            if changed { "applied" } else { "ignored" }
        );
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(GameSettings::default())
    }
}
