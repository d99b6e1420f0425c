//! Integration tests for the match session lifecycle: room admission,
//! lobby handoff, and pre-start failure paths.

use kuhn_coordinator::{
    Action, LobbyConfig, LocalRoom, MatchKind, MatchSession, MemoryMatchStore, Notification,
    PlayerId, PlayerMessage, SessionError,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn duel_session(
    room_timeout: Duration,
) -> (Arc<MatchSession>, Arc<LocalRoom>, Arc<MemoryMatchStore>) {
    let room = Arc::new(LocalRoom::new(2));
    let store = Arc::new(MemoryMatchStore::new());
    let session = MatchSession::new(
        MatchKind::Duel,
        2,
        room_timeout,
        LobbyConfig {
            hand_limit: 3,
            ..LobbyConfig::default()
        },
        room.clone(),
        store.clone(),
    )
    .expect("valid duel session");
    (Arc::new(session), room, store)
}

/// A headless client: admits itself, rendezvouses, and always plays the
/// first legal action until the match ends.
async fn run_agent(session: Arc<MatchSession>, room: Arc<LocalRoom>) {
    let lobby = session.lobby();
    let player = PlayerId::new_v4();
    lobby.register(player).expect("seat in the lobby");
    room.register().expect("seat in the room");
    lobby.await_both_connected().await.expect("rendezvous");

    loop {
        let notification = match lobby.poll_outbound(player).await {
            Ok(notification) => notification,
            Err(_) => return,
        };
        match notification {
            Notification::Error { reason } => panic!("match failed under a live agent: {reason}"),
            Notification::Stage { legal_actions, .. } => {
                if legal_actions.is_empty() {
                    return;
                }
                if legal_actions.iter().any(|action| action == "WAIT") {
                    continue;
                }
                if legal_actions.iter().any(|action| action == "START") {
                    let _ = lobby.submit(player, PlayerMessage::StartHand);
                    continue;
                }
                let action = Action::from_str(&legal_actions[0]).expect("wire action");
                let _ = lobby.submit(player, PlayerMessage::Move(action));
            }
        }
    }
}

#[tokio::test]
async fn test_session_runs_a_local_duel_to_completion() {
    let (session, room, store) = duel_session(Duration::from_secs(5));

    let agents = [
        tokio::spawn(run_agent(session.clone(), room.clone())),
        tokio::spawn(run_agent(session.clone(), room.clone())),
    ];
    timeout(Duration::from_secs(10), session.run())
        .await
        .expect("session finishes")
        .expect("session succeeds");
    for agent in agents {
        timeout(Duration::from_secs(5), agent)
            .await
            .expect("agent finishes")
            .expect("agent task clean");
    }

    let lobby = session.lobby();
    assert!(lobby.is_closed());
    assert_eq!(lobby.hands_completed(), 3);
    let record = store.get(session.id()).expect("match record");
    assert!(!record.is_failed);
    assert!(record.finished_at.is_some());
    assert_eq!(record.players.len(), 2);
}

#[tokio::test]
async fn test_session_aborts_when_the_room_never_fills() {
    let (session, room, store) = duel_session(Duration::from_millis(50));
    room.register().expect("lone seat");

    let result = session.run().await;
    assert_eq!(result, Err(SessionError::RoomTimeout));
    assert!(session.lobby().is_closed());

    let record = store.get(session.id()).expect("failure record");
    assert!(record.is_failed);
    assert!(
        record
            .error
            .as_deref()
            .is_some_and(|e| e.contains("timed out"))
    );
}

#[tokio::test]
async fn test_session_aborts_when_the_room_closes() {
    let (session, room, store) = duel_session(Duration::from_secs(5));
    let runner = tokio::spawn({
        let session = session.clone();
        async move { session.run().await }
    });
    sleep(Duration::from_millis(20)).await;
    room.close();

    let result = timeout(Duration::from_secs(2), runner)
        .await
        .expect("session returns")
        .expect("runner task clean");
    assert_eq!(result, Err(SessionError::RoomClosed));
    assert!(session.lobby().is_closed());
    assert!(store.get(session.id()).expect("failure record").is_failed);
}
