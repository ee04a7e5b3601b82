//! End-to-end room lifecycle through `AppState`, with paused tokio time

use std::time::Duration;

use snake_duel::broadcast::BroadcastReceiver;
use snake_duel::config::GameSettings;
use snake_duel::game::{Cell, Direction, GameStatus, Grid};
use snake_duel::protocol::{GameSnapshot, Opponent, ServerMessage};
use snake_duel::state::JoinRequest;
use snake_duel::{AppState, GameError};
use uuid::Uuid;

const TICK_MS: u64 = 150;

fn request(room: &str, name: &str) -> JoinRequest {
    JoinRequest::new(Some(room), Some(name), Opponent::Human).unwrap()
}

async fn advance_ticks(n: u64) {
    tokio::time::sleep(Duration::from_millis(TICK_MS * n + 10)).await;
}

/// Drain already-queued messages until a `gameState` shows up
fn next_state(rx: &mut BroadcastReceiver) -> Option<GameSnapshot> {
    while let Ok(msg) = rx.try_recv() {
        if let ServerMessage::GameState(snapshot) = msg.as_ref() {
            return Some(snapshot.clone());
        }
    }
    None
}

#[tokio::test(start_paused = true)]
async fn test_second_join_starts_game() {
    let state = AppState::default();

    let first = state.join(Uuid::new_v4(), request("R1", "Alice")).await.unwrap();
    assert_eq!(first.slot, 1);
    assert_eq!(first.snapshot.game_state, GameStatus::Waiting);
    assert_eq!(first.snapshot.players.len(), 1);
    assert_eq!(first.snapshot.players[0].snake, vec![Cell::new(5, 15)]);
    assert_eq!(first.snapshot.players[0].direction, Direction::Right);

    let second = state.join(Uuid::new_v4(), request("R1", "Bob")).await.unwrap();
    assert_eq!(second.slot, 2);
    assert_eq!(second.snapshot.game_state, GameStatus::Playing);
    assert_eq!(second.snapshot.players[1].snake, vec![Cell::new(25, 15)]);

    let room = state.registry.get("R1").unwrap();
    assert!(room.lock().await.has_ticker());

    advance_ticks(2).await;
    assert_eq!(room.lock().await.ticks(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_join_notifies_existing_players() {
    let state = AppState::default();
    let mut alice_rx = state
        .join(Uuid::new_v4(), request("R1", "Alice"))
        .await
        .unwrap()
        .receiver;
    state.join(Uuid::new_v4(), request("R1", "Bob")).await.unwrap();

    let mut counts = Vec::new();
    while let Ok(msg) = alice_rx.try_recv() {
        if let ServerMessage::PlayerJoined { player_count, .. } = msg.as_ref() {
            counts.push(*player_count);
        }
    }
    assert_eq!(counts, vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_eating_food_scores_and_grows() {
    let state = AppState::default();
    let alice = Uuid::new_v4();
    state.join(alice, request("R1", "Alice")).await.unwrap();
    state.join(Uuid::new_v4(), request("R1", "Bob")).await.unwrap();

    let room = state.registry.get("R1").unwrap();
    assert!(room.lock().await.set_food(Cell::new(6, 15)));

    advance_ticks(1).await;

    let room = room.lock().await;
    let snake = room.snake(&alice).unwrap();
    assert_eq!(snake.score(), 10);
    assert_eq!(snake.len(), 2);
    assert_eq!(snake.head(), Cell::new(6, 15));
    assert!(room.snakes().all(|s| !s.occupies(room.food())));
}

#[tokio::test(start_paused = true)]
async fn test_wall_death_keeps_body_and_ends_game() {
    let state = AppState::default();
    let alice = Uuid::new_v4();
    let mut rx = state.join(alice, request("R1", "Alice")).await.unwrap().receiver;
    state.join(Uuid::new_v4(), request("R1", "Bob")).await.unwrap();

    let room = state.registry.get("R1").unwrap();
    assert!(room.lock().await.set_food(Cell::new(0, 29)));
    state.change_direction(alice, "R1", Direction::Up).await;

    // 15 moves to reach the top row, the 16th leaves the board
    advance_ticks(15).await;
    assert_eq!(*room.lock().await.snake(&alice).unwrap().body(), vec![Cell::new(5, 0)]);

    advance_ticks(1).await;
    {
        let room = room.lock().await;
        let snake = room.snake(&alice).unwrap();
        assert!(!snake.is_alive());
        assert_eq!(*snake.body(), vec![Cell::new(5, 0)]);
        assert_eq!(room.status(), GameStatus::GameOver);
        assert_eq!(room.winner(), Some(2));
        assert!(!room.has_ticker());
    }

    let last = next_state(&mut rx).unwrap();
    assert_eq!(last.game_state, GameStatus::GameOver);
    assert_eq!(last.winner, Some(2));

    // Frozen after game over
    advance_ticks(5).await;
    assert_eq!(room.lock().await.ticks(), 16);
}

#[tokio::test(start_paused = true)]
async fn test_leave_during_play_stops_ticking() {
    let state = AppState::default();
    let mut alice_rx = state
        .join(Uuid::new_v4(), request("R1", "Alice"))
        .await
        .unwrap()
        .receiver;
    let bob = Uuid::new_v4();
    state.join(bob, request("R1", "Bob")).await.unwrap();

    advance_ticks(2).await;
    state.leave(bob, "R1").await;

    let room = state.registry.get("R1").unwrap();
    let ticks = {
        let room = room.lock().await;
        assert_eq!(room.player_count(), 1);
        assert_eq!(room.status(), GameStatus::GameOver);
        assert!(!room.has_ticker());
        room.ticks()
    };

    advance_ticks(10).await;
    assert_eq!(room.lock().await.ticks(), ticks);

    let mut saw_left = false;
    let mut last_state = None;
    while let Ok(msg) = alice_rx.try_recv() {
        match msg.as_ref() {
            ServerMessage::PlayerLeft { player_count, .. } => {
                assert_eq!(*player_count, 1);
                saw_left = true;
            }
            ServerMessage::GameState(snapshot) => last_state = Some(snapshot.clone()),
            _ => {}
        }
    }
    assert!(saw_left);
    let last_state = last_state.unwrap();
    assert_eq!(last_state.game_state, GameStatus::GameOver);
    assert_eq!(last_state.winner, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_mutual_death_ends_game_same_tick() {
    let settings = GameSettings {
        grid: Grid::new(12, 5),
        ..GameSettings::default()
    };
    let state = AppState::new(settings);
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    state.join(alice, request("R1", "Alice")).await.unwrap();
    state.join(bob, request("R1", "Bob")).await.unwrap();
    state.change_direction(alice, "R1", Direction::Up).await;
    state.change_direction(bob, "R1", Direction::Up).await;

    // Both heads reach row 0 after two ticks and leave the board on the third
    advance_ticks(3).await;

    let room = state.registry.get("R1").unwrap();
    let room = room.lock().await;
    assert_eq!(room.ticks(), 3);
    assert_eq!(room.status(), GameStatus::GameOver);
    assert!(room.snakes().all(|s| !s.is_alive()));
    assert_eq!(room.winner(), None);
}

#[tokio::test(start_paused = true)]
async fn test_third_player_is_refused() {
    let state = AppState::default();
    state.join(Uuid::new_v4(), request("R1", "Alice")).await.unwrap();
    state.join(Uuid::new_v4(), request("R1", "Bob")).await.unwrap();

    let refused = state.join(Uuid::new_v4(), request("R1", "Carol")).await;
    assert!(matches!(refused, Err(GameError::RoomFull)));

    let room = state.registry.get("R1").unwrap();
    assert_eq!(room.lock().await.player_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_join_after_game_over_starts_fresh() {
    let state = AppState::default();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    state.join(alice, request("R1", "Alice")).await.unwrap();
    state.join(bob, request("R1", "Bob")).await.unwrap();
    state.leave(bob, "R1").await;

    let carol = state.join(Uuid::new_v4(), request("R1", "Carol")).await.unwrap();
    assert_eq!(carol.slot, 1);
    assert_eq!(carol.snapshot.game_state, GameStatus::Waiting);
    assert_eq!(carol.snapshot.players.len(), 1);
    assert_eq!(carol.snapshot.players[0].name, "Carol");

    let again = state.join(alice, request("R1", "Alice")).await.unwrap();
    assert_eq!(again.slot, 2);
    assert_eq!(again.snapshot.game_state, GameStatus::Playing);
}

#[tokio::test(start_paused = true)]
async fn test_empty_room_is_destroyed_and_recreated() {
    let state = AppState::default();
    let alice = Uuid::new_v4();
    let mut old_rx = state.join(alice, request("R1", "Alice")).await.unwrap().receiver;
    state.leave(alice, "R1").await;
    assert_eq!(state.room_count(), 0);

    // Drain what was sent before the channel closed
    while old_rx.try_recv().is_ok() {}
    assert!(old_rx.recv().await.is_err());

    let mut rx = state.join(alice, request("R1", "Alice")).await.unwrap().receiver;
    assert_eq!(state.room_count(), 1);
    assert!(matches!(
        rx.recv().await.unwrap().as_ref(),
        ServerMessage::PlayerJoined { player_count: 1, .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_practice_room_with_bot() {
    let state = AppState::default();
    let alice = Uuid::new_v4();
    let practice = JoinRequest::new(Some("P1"), Some("Alice"), Opponent::Bot).unwrap();

    let accepted = state.join(alice, practice).await.unwrap();
    assert_eq!(accepted.snapshot.game_state, GameStatus::Playing);
    assert_eq!(accepted.snapshot.players.len(), 2);
    assert!(!accepted.snapshot.players[0].bot);
    assert!(accepted.snapshot.players[1].bot);

    let refused = state.join(Uuid::new_v4(), request("P1", "Bob")).await;
    assert!(matches!(refused, Err(GameError::RoomFull)));

    advance_ticks(3).await;
    let room = state.registry.get("P1").unwrap();
    assert_eq!(room.lock().await.ticks(), 3);

    state.leave(alice, "P1").await;
    assert_eq!(state.room_count(), 0);
    assert!(room.lock().await.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_rooms_are_independent() {
    let state = AppState::default();
    let alice = Uuid::new_v4();
    state.join(alice, request("R1", "Alice")).await.unwrap();
    state.join(Uuid::new_v4(), request("R1", "Bob")).await.unwrap();
    state.join(Uuid::new_v4(), request("R2", "Carol")).await.unwrap();

    state.change_direction(alice, "R2", Direction::Up).await;
    advance_ticks(2).await;

    let r1 = state.registry.get("R1").unwrap();
    let r2 = state.registry.get("R2").unwrap();
    assert_eq!(r1.lock().await.ticks(), 2);
    assert_eq!(r2.lock().await.ticks(), 0);
    assert_eq!(r2.lock().await.status(), GameStatus::Waiting);
    // Input addressed to a room Alice is not in changes nothing
    assert_eq!(
        r1.lock().await.snake(&alice).unwrap().direction(),
        Direction::Right
    );
}
