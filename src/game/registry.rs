//! Room registry: room code -> room simulation

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;

use super::room::Room;
use crate::config::GameSettings;
use crate::protocol::GameSnapshot;

/// A room behind its exclusion lock. Every operation on a room goes through it.
pub type SharedRoom = Arc<Mutex<Room>>;

/// All live rooms, keyed by room code. No capacity limit.
pub struct RoomRegistry {
    rooms: DashMap<String, SharedRoom>,
    settings: GameSettings,
}

impl RoomRegistry {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            rooms: DashMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Get the room for `room_id`, creating it if absent
    pub fn resolve(&self, room_id: &str) -> SharedRoom {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                info!("Created room {}", room_id);
                Arc::new(Mutex::new(Room::new(room_id, self.settings)))
            })
            .clone()
    }

    pub fn get(&self, room_id: &str) -> Option<SharedRoom> {
        self.rooms.get(room_id).map(|room| room.clone())
    }

    /// Remove `room_id` if it still maps to `room`. Idempotent, and a room
    /// recreated under the same code is left alone.
    pub fn remove(&self, room_id: &str, room: &SharedRoom) -> bool {
        let removed = self
            .rooms
            .remove_if(room_id, |_, current| Arc::ptr_eq(current, room))
            .is_some();
        if removed {
            info!("Destroyed room {}", room_id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Run `f` on every room currently `Playing`, each under its own lock.
    /// No ordering across rooms.
    pub async fn for_each_active<F>(&self, mut f: F)
    where
        F: FnMut(&Room),
    {
        // Clone the handles first so no map shard stays locked across an await
        let rooms: Vec<SharedRoom> = self.rooms.iter().map(|entry| entry.value().clone()).collect();

        for room in rooms {
            let room = room.lock().await;
            if room.is_playing() {
                f(&room);
            }
        }
    }

    /// Snapshot of every `Playing` room
    pub async fn active_snapshots(&self) -> Vec<(String, GameSnapshot)> {
        let mut snapshots = Vec::new();
        self.for_each_active(|room| snapshots.push((room.id().to_string(), room.snapshot())))
            .await;
        snapshots
    }
}
