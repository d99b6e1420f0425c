//! # Kuhn Coordinator
//!
//! A server-side authority for live, two-party Kuhn poker matches between
//! independently connected clients.
//!
//! ## Architecture
//!
//! The core is a per-match [`lobby::Lobby`] with a single coordinator task:
//!
//! - **Registration**: exactly two participants join; a rendezvous gate
//!   releases once both are in, and the first observer starts the
//!   coordinator loop.
//! - **Single writer**: participants enqueue messages onto a shared inbound
//!   queue and read their own outbound channel; only the coordinator task
//!   mutates hand and game-tree state, so two submissions can never race
//!   inside a transition.
//! - **Information partition**: each stage message carries exactly the
//!   information its recipient's role is entitled to see; the opponent's
//!   private card is revealed only at terminal showdown.
//! - **Bounded waits**: a missing second player or a silent participant
//!   fails the match with an error notification to everyone registered,
//!   rather than leaving the other side hanging.
//!
//! Persistence and room admission are external collaborators behind the
//! [`session::MatchStore`] and [`session::RoomAdmission`] traits; transport
//! is out of scope entirely.
//!
//! ## Example
//!
//! ```ignore
//! use kuhn_coordinator::{Lobby, LobbyConfig, MatchId, NullMatchStore, PlayerId};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let lobby = Lobby::new(
//!         MatchId::new_v4(),
//!         LobbyConfig::default(),
//!         Arc::new(NullMatchStore),
//!     );
//!     let player = PlayerId::new_v4();
//!     lobby.register(player).unwrap();
//!     // A second client registers elsewhere, then both rendezvous:
//!     lobby.await_both_connected().await.unwrap();
//!     // Drive the match through submit / poll_outbound.
//! }
//! ```

/// The Kuhn game tree: cards, actions, states, transitions, projections.
pub mod game;

/// Per-match lobby, participants, hands, and the coordinator loop.
pub mod lobby;

/// Match lifecycle glue and external collaborator seams.
pub mod session;

pub use game::{Action, Card, Deal, GameState, IllegalAction, ParseActionError, Seat};
pub use lobby::{
    Hand, LOBBY_CAPACITY, Lobby, LobbyConfig, LobbyError, MatchId, Notification, Participant,
    ParseMessageError, PlayerId, PlayerMessage, Submission,
};
pub use session::{
    LocalRoom, MatchKind, MatchRecord, MatchSession, MatchStore, MemoryMatchStore, NullMatchStore,
    RoomAdmission, SessionError,
};
