//! Immutable game states and the transition function.

use super::entities::{Action, Card, Deal, Seat};
use rand::Rng;
use thiserror::Error;

/// An action was submitted at a node where it is not available.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{action} is not legal after [{history}]")]
pub struct IllegalAction {
    pub action: Action,
    /// Public action history at the point of the offense. Never contains
    /// private cards, so it is safe to log.
    pub history: String,
}

/// One node of the Kuhn game tree: a dealing plus the public action history.
///
/// Transitions are forward-only and produce fresh states; terminal states
/// have an empty legal-action set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameState {
    deal: Deal,
    history: Vec<Action>,
}

impl GameState {
    /// Deals a fresh hand with a uniformly random hidden-card assignment.
    pub fn deal(rng: &mut impl Rng) -> Self {
        Self::with_deal(Deal::random(rng))
    }

    /// Starts a hand from a known dealing.
    pub fn with_deal(deal: Deal) -> Self {
        Self {
            deal,
            history: Vec::new(),
        }
    }

    /// The private card held by `seat`.
    pub fn card(&self, seat: Seat) -> Card {
        self.deal.card(seat)
    }

    /// Public action history, oldest first.
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    /// Ordered actions available to the player to move. Empty at terminals.
    pub fn legal_actions(&self) -> &'static [Action] {
        use Action::{Bet, Call, Check, Fold};
        match self.history.as_slice() {
            [] | [Check] => &[Check, Bet],
            [Bet] | [Check, Bet] => &[Call, Fold],
            _ => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.legal_actions().is_empty()
    }

    /// Seat entitled to act, or `None` at a terminal.
    pub fn to_move(&self) -> Option<Seat> {
        if self.is_terminal() {
            None
        } else if self.history.len() % 2 == 0 {
            Some(Seat::First)
        } else {
            Some(Seat::Second)
        }
    }

    /// Applies a legal action, yielding the successor state.
    pub fn apply(&self, action: Action) -> Result<GameState, IllegalAction> {
        if !self.legal_actions().contains(&action) {
            return Err(IllegalAction {
                action,
                history: self.history_repr(),
            });
        }
        let mut next = self.clone();
        next.history.push(action);
        Ok(next)
    }

    /// First mover's winnings at a terminal, `None` otherwise. Both players
    /// ante 1; a bet puts in 1 more.
    pub fn payoff(&self) -> Option<i64> {
        use Action::{Bet, Call, Check, Fold};
        let stake = match self.history.as_slice() {
            [Check, Check] => 1,
            [Bet, Call] | [Check, Bet, Call] => 2,
            [Bet, Fold] => return Some(1),
            [Check, Bet, Fold] => return Some(-1),
            _ => return None,
        };
        if self.card(Seat::First) > self.card(Seat::Second) {
            Some(stake)
        } else {
            Some(-stake)
        }
    }

    /// Everything `viewer` is entitled to observe: their own card and the
    /// public history. The opponent's card appears only once the state is
    /// terminal (showdown reveal).
    pub fn info_set(&self, viewer: Seat) -> String {
        let cards = if self.is_terminal() {
            format!("{}{}", self.card(Seat::First), self.card(Seat::Second))
        } else {
            self.card(viewer).to_string()
        };
        let mut repr = format!(".{cards}");
        for action in &self.history {
            repr.push('.');
            repr.push_str(action.as_str());
        }
        repr
    }

    fn history_repr(&self) -> String {
        self.history
            .iter()
            .map(|action| action.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}
