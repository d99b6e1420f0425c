//! Lobby error types.

use super::PlayerId;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by lobby operations and the coordinator loop.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LobbyError {
    /// Registration beyond the two-player capacity. Recoverable by the
    /// caller: reject the late joiner, the match is unaffected.
    #[error("game lobby is full")]
    LobbyFull,

    #[error("game lobby is closed")]
    Closed,

    #[error("player {0} is not registered in this lobby")]
    UnknownPlayer(PlayerId),

    /// The second participant never arrived. Fatal to the match.
    #[error("timed out waiting for another player to connect")]
    RendezvousTimeout,

    /// No inbound message arrived while the match was live. Fatal to the
    /// match: a silent party is indistinguishable from a disconnected one.
    #[error("there was no message from a player for more than {0:?}")]
    LivenessTimeout(Duration),

    /// A hand was created while the previous one was still running.
    #[error("it is not allowed to start a new hand while the previous one is not completed")]
    HandInProgress,
}
