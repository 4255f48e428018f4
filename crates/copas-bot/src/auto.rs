use crate::strategy::{PassView, PlayView, Strategy};
use copas_core::model::card::Card;
use copas_core::model::rank::Rank;
use copas_core::model::suit::Suit;

/// Fully automatic strategy. Passing unloads the queen of spades, high
/// spades and high hearts first; play stays low and avoids taking tricks
/// that already carry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoStrategy;

impl AutoStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for AutoStrategy {
    fn choose_pass(&mut self, view: &PassView<'_>) -> [Card; 3] {
        let mut picks: Vec<Card> = Vec::with_capacity(3);
        let take = |card: Card, picks: &mut Vec<Card>| {
            if picks.len() < 3 && view.hand.contains(card) && !picks.contains(&card) {
                picks.push(card);
            }
        };

        take(Card::QUEEN_OF_SPADES, &mut picks);
        for rank in [Rank::Ace, Rank::King] {
            take(Card::new(rank, Suit::Spades), &mut picks);
        }
        for rank in [Rank::Ace, Rank::King, Rank::Queen, Rank::Jack] {
            take(Card::new(rank, Suit::Hearts), &mut picks);
        }

        // Top up with the strongest remaining cards.
        let mut rest: Vec<Card> = view
            .hand
            .iter()
            .copied()
            .filter(|c| !picks.contains(c))
            .collect();
        rest.sort_by_key(|c| std::cmp::Reverse(c.rank.strength()));
        for card in rest {
            if picks.len() == 3 {
                break;
            }
            picks.push(card);
        }

        [picks[0], picks[1], picks[2]]
    }

    fn choose_play(&mut self, view: &PlayView<'_>) -> Card {
        let lowest = |cards: &[Card]| -> Card {
            cards
                .iter()
                .copied()
                .min_by_key(|c| c.rank.strength())
                .expect("legal set is never empty")
        };

        if view.trick.is_empty() {
            // Lead low, keeping hearts back while a choice remains.
            let non_hearts: Vec<Card> = view
                .legal
                .iter()
                .copied()
                .filter(|c| !c.suit.is_heart())
                .collect();
            if !non_hearts.is_empty() && !view.hearts_broken {
                return lowest(&non_hearts);
            }
            return lowest(view.legal);
        }

        // Following: ducking low never takes points already on the table.
        lowest(view.legal)
    }
}
