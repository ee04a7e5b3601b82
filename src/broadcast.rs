//! Broadcaster abstraction for per-room message fan-out
//!
//! Current implementation keeps one in-memory tokio broadcast channel per room.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::BROADCAST_CAPACITY;
use crate::protocol::ServerMessage;

/// Receiver type for broadcast messages
pub type BroadcastReceiver = broadcast::Receiver<Arc<ServerMessage>>;

/// Trait for broadcasting messages to every connection observing a room
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Subscribe to a room's messages, creating its channel if needed
    fn subscribe(&self, room_id: &str) -> BroadcastReceiver;

    /// Send a message to all subscribers of a room
    async fn send(&self, room_id: &str, msg: ServerMessage);

    /// Drop a room's channel; its subscribers observe `Closed`
    fn close(&self, room_id: &str);
}

/// In-memory broadcaster using tokio broadcast channels
pub struct InMemoryBroadcaster {
    channels: DashMap<String, broadcast::Sender<Arc<ServerMessage>>>,
    capacity: usize,
}

impl InMemoryBroadcaster {
    /// Create a new in-memory broadcaster
    pub fn new() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }

    /// Create with custom per-room capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }
}

impl Default for InMemoryBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broadcaster for InMemoryBroadcaster {
    fn subscribe(&self, room_id: &str) -> BroadcastReceiver {
        self.channels
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    async fn send(&self, room_id: &str, msg: ServerMessage) {
        let Some(tx) = self.channels.get(room_id).map(|tx| tx.clone()) else {
            debug!("Broadcast to room {} without channel dropped", room_id);
            return;
        };

        // Wrap in Arc for zero-copy broadcast
        if let Err(e) = tx.send(Arc::new(msg)) {
            debug!("Broadcast send to room {} (no receivers): {}", room_id, e);
        }
    }

    fn close(&self, room_id: &str) {
        self.channels.remove(room_id);
    }
}
