//! WebSocket handler for client connections

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::broadcast::BroadcastReceiver;
use crate::game::direction::Direction;
use crate::game::room::ConnectionId;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, JoinRequest};

type SocketSender = SplitSink<WebSocket, Message>;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection state. A connection sits in at most one room.
struct Session {
    id: ConnectionId,
    room: Option<String>,
    updates: Option<BroadcastReceiver>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            room: None,
            updates: None,
        }
    }

    async fn leave_room(&mut self, state: &AppState) {
        self.updates = None;
        if let Some(room_id) = self.room.take() {
            state.leave(self.id, &room_id).await;
        }
    }
}

/// Next message of the current room, or never when not in a room
async fn next_update(updates: &mut Option<BroadcastReceiver>) -> Result<Arc<ServerMessage>, RecvError> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn send_message(sender: &mut SocketSender, msg: &ServerMessage) -> bool {
    sender.send(Message::Text(msg.to_json().into())).await.is_ok()
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let mut session = Session::new();
    info!("Connection {} opened", session.id);

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            frame = receiver.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("Connection {} sent close", session.id);
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("WebSocket error for connection {}: {}", session.id, e);
                        break;
                    }
                };

                let reply = handle_text(&state, &mut session, text.as_str()).await;
                if let Some(reply) = reply {
                    if !send_message(&mut sender, &reply).await {
                        break;
                    }
                }
            }
            update = next_update(&mut session.updates) => {
                match update {
                    Ok(msg) => {
                        if !send_message(&mut sender, &msg).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!("Connection {} lagged by {} messages", session.id, n);
                    }
                    Err(RecvError::Closed) => {
                        // Room was destroyed under us
                        session.updates = None;
                    }
                }
            }
        }
    }

    session.leave_room(&state).await;
    info!("Connection {} closed", session.id);
}

/// Apply one client frame. Returns the direct reply to the sender, if any.
async fn handle_text(state: &AppState, session: &mut Session, text: &str) -> Option<ServerMessage> {
    let msg = match ClientMessage::parse(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Malformed message from {}: {}", session.id, e);
            return Some(ServerMessage::from_error(&e));
        }
    };

    match msg {
        ClientMessage::JoinRoom {
            room_id,
            player_name,
            opponent,
        } => {
            let request = match JoinRequest::new(room_id.as_deref(), player_name.as_deref(), opponent) {
                Ok(request) => request,
                Err(e) => return Some(ServerMessage::from_error(&e)),
            };

            if session.room.as_deref() != Some(request.room_id.as_str()) {
                session.leave_room(state).await;
            }

            match state.join(session.id, request).await {
                Ok(accepted) => {
                    session.room = Some(accepted.room_id);
                    session.updates = Some(accepted.receiver);
                    Some(ServerMessage::GameState(accepted.snapshot))
                }
                Err(e) => Some(ServerMessage::from_error(&e)),
            }
        }
        ClientMessage::ChangeDirection { direction } => {
            let direction = match Direction::try_from(direction) {
                Ok(direction) => direction,
                Err(e) => return Some(ServerMessage::from_error(&e)),
            };
            if let Some(room_id) = session.room.as_deref() {
                state.change_direction(session.id, room_id, direction).await;
            }
            None
        }
        ClientMessage::LeaveRoom => {
            session.leave_room(state).await;
            None
        }
        ClientMessage::Ping => Some(ServerMessage::Pong),
    }
}
