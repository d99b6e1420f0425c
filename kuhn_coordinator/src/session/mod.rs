//! Match lifecycle glue around a lobby.
//!
//! A [`MatchSession`] validates the format configuration, owns the lobby,
//! waits on the external room-admission collaborator, and records pre-start
//! failures. Everything after rendezvous is the coordinator loop's job; the
//! only concurrency hazard here is the close-once guard.

pub mod room;
pub mod store;

pub use room::{LocalRoom, RoomAdmission};
pub use store::{MatchRecord, MatchStore, MemoryMatchStore, NullMatchStore};

use crate::lobby::{Lobby, LobbyConfig, MatchId};
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while setting up or admitting a match.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    #[error("capacity should be set to 2 in case of the duel")]
    DuelCapacity,

    #[error("capacity should be set to a number of power of two in case of the tournament")]
    TournamentCapacity,

    #[error("invalid lobby config: {0}")]
    InvalidConfig(String),

    #[error("waiting room is full")]
    RoomFull,

    #[error("timed out waiting for the room to reach capacity")]
    RoomTimeout,

    #[error("waiting room has been closed unexpectedly")]
    RoomClosed,
}

/// Match format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchKind {
    /// Head-to-head: exactly two seats.
    Duel,
    /// Bracketed elimination: a power-of-two seat count above two.
    Tournament,
}

impl MatchKind {
    pub fn validate_capacity(self, capacity: usize) -> Result<(), SessionError> {
        match self {
            MatchKind::Duel if capacity != 2 => Err(SessionError::DuelCapacity),
            MatchKind::Tournament if capacity <= 2 || !capacity.is_power_of_two() => {
                Err(SessionError::TournamentCapacity)
            }
            _ => Ok(()),
        }
    }
}

/// Per-match owner of the lobby and its external collaborators.
pub struct MatchSession {
    id: MatchId,
    kind: MatchKind,
    room_timeout: Duration,
    lobby: Arc<Lobby>,
    room: Arc<dyn RoomAdmission>,
    store: Arc<dyn MatchStore>,
    failed: AtomicBool,
}

impl MatchSession {
    pub fn new(
        kind: MatchKind,
        capacity: usize,
        room_timeout: Duration,
        config: LobbyConfig,
        room: Arc<dyn RoomAdmission>,
        store: Arc<dyn MatchStore>,
    ) -> Result<Self, SessionError> {
        kind.validate_capacity(capacity)?;
        config.validate().map_err(SessionError::InvalidConfig)?;

        let id = Uuid::new_v4();
        let lobby = Lobby::new(id, config, Arc::clone(&store));
        info!("match {id} ({kind:?}) created");
        Ok(Self {
            id,
            kind,
            room_timeout,
            lobby,
            room,
            store,
            failed: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    pub fn lobby(&self) -> Arc<Lobby> {
        Arc::clone(&self.lobby)
    }

    /// Waits for admission, then for the lobby's coordinator loop to run the
    /// match to its end.
    pub async fn run(&self) -> Result<(), SessionError> {
        if !self
            .room
            .wait_until_capacity_reached(self.room_timeout)
            .await
        {
            return self.abort(SessionError::RoomTimeout).await;
        }
        if self.room.is_closed() {
            return self.abort(SessionError::RoomClosed).await;
        }
        self.lobby.wait_closed().await;
        info!("match {} finished", self.id);
        Ok(())
    }

    /// Pre-start failure path: record it and close the lobby, exactly once.
    async fn abort(&self, reason: SessionError) -> Result<(), SessionError> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            warn!("match {} failed before start: {reason}", self.id);
            if let Err(e) = self
                .store
                .record_match_finished(self.id, true, Some(reason.to_string()))
                .await
            {
                error!("match {}: failed to record failure: {e:#}", self.id);
            }
            self.lobby.close();
        }
        Err(reason)
    }
}
