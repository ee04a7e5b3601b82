//! Periodic drivers: the per-room tick loop and the global snapshot broadcast

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::registry::{RoomRegistry, SharedRoom};
use crate::broadcast::Broadcaster;
use crate::protocol::ServerMessage;

/// Spawn the tick driver for one round of a room.
///
/// Every tick takes the room lock, re-checks that the room is still playing the
/// same round and only then advances it, so no tick can land after game over or
/// after the room emptied. When a tick ends the game, the final snapshot is
/// pushed to the room right away.
pub fn spawn_ticker(
    room: SharedRoom,
    broadcaster: Arc<dyn Broadcaster>,
    round: u64,
    period: Duration,
) -> AbortHandle {
    let handle = tokio::spawn(async move {
        let mut tick_interval = interval(period);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately
        tick_interval.tick().await;

        loop {
            tick_interval.tick().await;

            let mut room = room.lock().await;
            if room.round() != round || !room.is_playing() {
                debug!("[{}] ticker for round {} stopped", room.id(), round);
                break;
            }

            room.steer_bots();
            let report = room.tick();

            if report.game_over {
                let snapshot = room.snapshot();
                broadcaster
                    .send(room.id(), ServerMessage::GameState(snapshot))
                    .await;
                break;
            }
        }
    });

    handle.abort_handle()
}

/// Spawn the broadcast driver: every `period`, push a snapshot of each playing
/// room to its observers.
pub fn spawn_broadcast_loop(
    registry: Arc<RoomRegistry>,
    broadcaster: Arc<dyn Broadcaster>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut broadcast_interval = interval(period);
        broadcast_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Broadcast loop started (every {}ms)", period.as_millis());

        loop {
            broadcast_interval.tick().await;

            for (room_id, snapshot) in registry.active_snapshots().await {
                broadcaster
                    .send(&room_id, ServerMessage::GameState(snapshot))
                    .await;
            }
        }
    })
}
