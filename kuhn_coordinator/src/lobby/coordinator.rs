//! The coordinator loop: sole writer of hand and game-tree state.

use super::messages::{PlayerMessage, START_TAG, Submission, WAIT_TAG};
use super::{Hand, Lobby, LobbyError, PlayerId};
use crate::game::{Action, GameState, Seat};
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

/// Drives one match from rendezvous to completion. Owns the active hand
/// outright; nothing else may mutate it.
pub(crate) struct Coordinator {
    lobby: Arc<Lobby>,
    players: [PlayerId; 2],
    current: Option<Hand>,
    completed: usize,
}

impl Coordinator {
    pub(crate) fn new(lobby: Arc<Lobby>, players: [PlayerId; 2]) -> Self {
        Self {
            lobby,
            players,
            current: None,
            completed: 0,
        }
    }

    pub(crate) async fn run(mut self, mut inbound: UnboundedReceiver<Submission>) {
        info!(
            "lobby {}: match running between {} and {}",
            self.lobby.id(),
            self.players[0],
            self.players[1]
        );
        match self.drive(&mut inbound).await {
            Ok(()) => self.lobby.finish().await,
            Err(reason) => self.lobby.fail(&reason).await,
        }
    }

    async fn drive(&mut self, inbound: &mut UnboundedReceiver<Submission>) -> Result<(), LobbyError> {
        // First hand is dealt up front; both players get their opening view
        // without having to ask.
        self.next_hand()?;
        for player in self.players {
            self.deliver_hand_start(player);
        }

        let window = self.lobby.config().message_timeout;
        loop {
            // Once the lobby closes, drain what is already queued and stop.
            if self.lobby.is_closed() {
                match inbound.try_recv() {
                    Ok(submission) => self.dispatch(submission)?,
                    Err(_) => return Ok(()),
                }
                continue;
            }
            match timeout(window, inbound.recv()).await {
                Ok(Some(submission)) => self.dispatch(submission)?,
                Ok(None) => return Ok(()),
                Err(_) => return Err(LobbyError::LivenessTimeout(window)),
            }
        }
    }

    fn dispatch(&mut self, Submission { player, message }: Submission) -> Result<(), LobbyError> {
        debug!("lobby {}: received {message} from {player}", self.lobby.id());
        match message {
            PlayerMessage::StartHand => self.handle_start_request(player),
            PlayerMessage::Move(action) => {
                self.handle_move(player, action);
                Ok(())
            }
            // A correct client's no-op while the opponent is to move.
            PlayerMessage::Wait => Ok(()),
        }
    }

    fn handle_start_request(&mut self, player: PlayerId) -> Result<(), LobbyError> {
        if self.completed >= self.lobby.config().hand_limit {
            if self.lobby.is_closed() {
                debug!(
                    "lobby {}: discarding start request from {player} after match end",
                    self.lobby.id()
                );
                return Ok(());
            }
            self.broadcast_standings();
            self.lobby.close();
            return Ok(());
        }
        if self.current.is_none() {
            self.next_hand()?;
        }
        self.deliver_hand_start(player);
        Ok(())
    }

    /// Deals the next hand and picks a random first mover. Fails loudly if
    /// the previous hand is unfinished.
    fn next_hand(&mut self) -> Result<(), LobbyError> {
        if self
            .current
            .as_ref()
            .is_some_and(|hand| !hand.state.is_terminal())
        {
            return Err(LobbyError::HandInProgress);
        }
        let mut rng = rand::rng();
        let first_mover = self.players[rng.random_range(0..self.players.len())];
        let hand = Hand::new(self.completed, GameState::deal(&mut rng), first_mover);
        debug!(
            "lobby {}: hand {} dealt, {first_mover} moves first",
            self.lobby.id(),
            hand.index
        );
        self.current = Some(hand);
        Ok(())
    }

    /// Sends the "hand started" stage message, at most once per participant:
    /// the first mover gets their card and the opening actions, the other
    /// gets their card and a wait directive.
    fn deliver_hand_start(&mut self, player: PlayerId) {
        let Some(hand) = self.current.as_mut() else {
            return;
        };
        if !hand.mark_started(player) {
            return;
        }
        let card = hand.state.card(hand.seat_of(player)).to_string();
        let actions = if player == hand.turn {
            wire_actions(hand.state.legal_actions())
        } else {
            vec![WAIT_TAG.to_string()]
        };
        self.lobby.send_stage_to(player, &card, actions);
    }

    fn handle_move(&mut self, player: PlayerId, action: Action) {
        let Some(hand) = self.current.as_mut() else {
            warn!(
                "lobby {}: stale {action} from {player} with no hand running",
                self.lobby.id()
            );
            return;
        };
        if player != hand.turn {
            warn!(
                "lobby {}: discarding {action} from {player}, not their turn",
                self.lobby.id()
            );
            return;
        }
        match hand.state.apply(action) {
            Err(e) => warn!("lobby {}: discarding move from {player}: {e}", self.lobby.id()),
            Ok(next) => {
                hand.state = next;
                if hand.state.is_terminal() {
                    self.finish_hand();
                } else {
                    // Flip the turn and prompt the opponent; the player who
                    // just acted already holds their wait state.
                    let Some(opponent) = self.lobby.opponent_of(player) else {
                        return;
                    };
                    hand.turn = opponent;
                    let prompt = hand.state.info_set(hand.seat_of(opponent));
                    let actions = wire_actions(hand.state.legal_actions());
                    self.lobby.send_stage_to(opponent, &prompt, actions);
                }
            }
        }
    }

    /// Settles banks, reveals the showdown to both players, and retires the
    /// hand into history.
    fn finish_hand(&mut self) {
        let Some(hand) = self.current.take() else {
            return;
        };
        if let Some(payoff) = hand.state.payoff() {
            self.lobby.settle(hand.first_mover, payoff);
        }
        let showdown = hand.state.info_set(Seat::First);
        self.lobby
            .broadcast_stage(&format!("END:{showdown}"), vec![START_TAG.to_string()]);
        info!(
            "lobby {}: hand {} complete: {showdown}",
            self.lobby.id(),
            hand.index
        );
        self.completed += 1;
        self.lobby.push_hand(hand);
    }

    /// Final standings come from the accumulated banks: highest bank wins,
    /// equal banks draw.
    fn broadcast_standings(&self) {
        let standings = self.lobby.standings();
        let top = standings
            .iter()
            .map(|(_, bank)| *bank)
            .max()
            .unwrap_or_default();
        let drawn = standings.iter().all(|(_, bank)| *bank == top);
        for (player, bank) in standings {
            let verdict = if drawn {
                "DRAW"
            } else if bank == top {
                "WIN"
            } else {
                "DEFEAT"
            };
            self.lobby.send_stage_to(player, verdict, Vec::new());
        }
        info!(
            "lobby {}: hand limit of {} reached, match complete",
            self.lobby.id(),
            self.lobby.config().hand_limit
        );
    }
}

fn wire_actions(actions: &[Action]) -> Vec<String> {
    actions.iter().map(|action| action.to_string()).collect()
}
