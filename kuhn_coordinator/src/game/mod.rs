//! Kuhn poker game tree.
//!
//! The game is a two-player, perfect-recall, imperfect-information
//! extensive-form game over a fixed three-card deck. States are immutable:
//! applying an action produces a new state, so every prior state of a hand
//! stays inspectable and only the coordinator loop ever holds a mutable
//! handle to the current one.

pub mod entities;
pub mod tree;

pub use entities::{Action, Card, Deal, ParseActionError, Seat};
pub use tree::{GameState, IllegalAction};
