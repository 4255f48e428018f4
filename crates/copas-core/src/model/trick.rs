use crate::model::card::Card;
use crate::model::node::NodeId;
use crate::model::suit::Suit;
use std::fmt;

/// One round of four plays, recorded in the temporal order the PLAY_CARD
/// broadcasts were observed. The leader is whoever played first.
#[derive(Debug, Clone, Default)]
pub struct Trick {
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Play {
    pub node: NodeId,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrickError {
    TrickComplete,
    AlreadyPlayed(NodeId),
}

impl fmt::Display for TrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickError::TrickComplete => write!(f, "trick already has four cards"),
            TrickError::AlreadyPlayed(node) => {
                write!(f, "{node} has already played this trick")
            }
        }
    }
}

impl std::error::Error for TrickError {}

impl Trick {
    pub fn new() -> Self {
        Self {
            plays: Vec::with_capacity(4),
        }
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == 4
    }

    pub fn leader(&self) -> Option<NodeId> {
        self.plays.first().map(|play| play.node)
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.plays.iter().any(|play| play.node == node)
    }

    pub fn push(&mut self, node: NodeId, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }
        if self.contains(node) {
            return Err(TrickError::AlreadyPlayed(node));
        }
        self.plays.push(Play { node, card });
        Ok(())
    }

    /// Highest strength in the lead suit takes the trick; off-suit cards
    /// cannot win. `None` until the trick is complete.
    pub fn winner(&self) -> Option<NodeId> {
        if !self.is_complete() {
            return None;
        }
        let lead = self.lead_suit()?;
        self.plays
            .iter()
            .filter(|play| play.card.suit == lead)
            .max_by_key(|play| play.card.rank.strength())
            .map(|play| play.node)
    }

    pub fn points(&self) -> u8 {
        self.plays
            .iter()
            .map(|play| play.card.penalty_value())
            .sum()
    }

    pub fn clear(&mut self) {
        self.plays.clear();
    }
}
