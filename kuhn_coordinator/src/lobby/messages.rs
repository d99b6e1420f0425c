//! Lobby wire messages: inbound player submissions and outbound notifications.

use super::PlayerId;
use crate::game::Action;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire tag a client sends to request the next hand.
pub const START_TAG: &str = "START";
/// Wire tag a correctly waiting client may send as a heartbeat, and the tag
/// offered in a stage message when the recipient must wait.
pub const WAIT_TAG: &str = "WAIT";

/// A raw client string matched no message variant.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unrecognized player message: {0}")]
pub struct ParseMessageError(pub String);

/// Everything a player may put on the inbound queue. A closed set, so the
/// coordinator's dispatch is a total match instead of string comparison.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayerMessage {
    /// Request to start the next hand (not a game action).
    StartHand,
    /// A game-tree action.
    Move(Action),
    /// Benign no-op from a client that is correctly waiting its turn.
    Wait,
}

impl FromStr for PlayerMessage {
    type Err = ParseMessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            START_TAG => Ok(PlayerMessage::StartHand),
            WAIT_TAG => Ok(PlayerMessage::Wait),
            _ => s
                .parse::<Action>()
                .map(PlayerMessage::Move)
                .map_err(|_| ParseMessageError(s.to_string())),
        }
    }
}

impl fmt::Display for PlayerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerMessage::StartHand => write!(f, "{START_TAG}"),
            PlayerMessage::Move(action) => write!(f, "{action}"),
            PlayerMessage::Wait => write!(f, "{WAIT_TAG}"),
        }
    }
}

/// One entry on the shared inbound queue.
#[derive(Clone, Copy, Debug)]
pub struct Submission {
    pub player: PlayerId,
    pub message: PlayerMessage,
}

/// A message delivered on a participant's outbound channel.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Notification {
    /// The recipient's current prompt plus the actions they may submit.
    /// An empty set means the match is over; `[WAIT]` means hold.
    #[serde(rename_all = "camelCase")]
    Stage {
        prompt: String,
        legal_actions: Vec<String>,
    },
    /// Terminates the recipient's view of the match.
    Error { reason: String },
}

impl Notification {
    pub fn stage(prompt: impl Into<String>, legal_actions: Vec<String>) -> Self {
        Notification::Stage {
            prompt: prompt.into(),
            legal_actions,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Notification::Error {
            reason: reason.into(),
        }
    }

    /// Encodes for the transport layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
