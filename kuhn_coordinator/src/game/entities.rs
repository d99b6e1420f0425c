//! Cards, seats, actions, and dealings for the Kuhn game tree.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the three cards in the Kuhn deck. Variant order doubles as rank.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Card {
    Jack,
    Queen,
    King,
}

impl Card {
    pub const fn as_str(self) -> &'static str {
        match self {
            Card::Jack => "J",
            Card::Queen => "Q",
            Card::King => "K",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position within a hand. The first seat belongs to the first mover.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub const fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

/// A move a player can submit at a decision node.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Check,
    Bet,
    Call,
    Fold,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Check => "CHECK",
            Action::Bet => "BET",
            Action::Call => "CALL",
            Action::Fold => "FOLD",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A string was submitted that names no known action.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unrecognized action: {0}")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHECK" => Ok(Action::Check),
            "BET" => Ok(Action::Bet),
            "CALL" => Ok(Action::Call),
            "FOLD" => Ok(Action::Fold),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

/// A hidden-information assignment: one private card per seat.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Deal([Card; 2]);

impl Deal {
    /// Every legal dealing of two distinct cards from the deck.
    pub const ALL: [Deal; 6] = [
        Deal([Card::Jack, Card::Queen]),
        Deal([Card::Jack, Card::King]),
        Deal([Card::Queen, Card::Jack]),
        Deal([Card::Queen, Card::King]),
        Deal([Card::King, Card::Jack]),
        Deal([Card::King, Card::Queen]),
    ];

    /// Picks a dealing uniformly at random.
    pub fn random(rng: &mut impl Rng) -> Deal {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub const fn card(self, seat: Seat) -> Card {
        match seat {
            Seat::First => self.0[0],
            Seat::Second => self.0[1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_ranking() {
        assert!(Card::King > Card::Queen);
        assert!(Card::Queen > Card::Jack);
        assert!(Card::King > Card::Jack);
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card::Jack.to_string(), "J");
        assert_eq!(Card::Queen.to_string(), "Q");
        assert_eq!(Card::King.to_string(), "K");
    }

    #[test]
    fn test_action_wire_round_trip() {
        for action in [Action::Check, Action::Bet, Action::Call, Action::Fold] {
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn test_action_parse_rejects_unknown() {
        assert_eq!(
            "RAISE".parse::<Action>(),
            Err(ParseActionError("RAISE".to_string()))
        );
    }

    #[test]
    fn test_dealings_are_distinct_pairs() {
        for deal in Deal::ALL {
            assert_ne!(deal.card(Seat::First), deal.card(Seat::Second));
        }
    }

    #[test]
    fn test_random_deal_is_legal() {
        let mut rng = rand::rng();
        for _ in 0..32 {
            let deal = Deal::random(&mut rng);
            assert!(Deal::ALL.contains(&deal));
        }
    }
}
