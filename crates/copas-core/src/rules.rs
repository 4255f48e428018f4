//! Pure legality rules. Every node runs these locally to validate its own
//! candidate plays; the coordinator relies on [`Trick::winner`] and
//! [`Trick::points`] for scoring.
//!
//! [`Trick::winner`]: crate::model::trick::Trick::winner
//! [`Trick::points`]: crate::model::trick::Trick::points

use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::trick::Trick;

/// The set of cards `hand` may legally contribute to `trick`.
///
/// Leading the first trick of a hand forces 2C. Leading later tricks forbids
/// hearts until they are broken, unless the hand is nothing but hearts.
/// Following requires the lead suit when possible; a void hand may discard
/// anything except that the first trick admits no heart and no QS unless
/// only penalty cards remain.
pub fn legal_plays(hand: &Hand, trick: &Trick, hearts_broken: bool, first_trick: bool) -> Vec<Card> {
    if hand.is_empty() {
        return Vec::new();
    }

    if trick.is_empty() {
        return legal_leads(hand, hearts_broken, first_trick);
    }

    let lead = trick.lead_suit().expect("non-empty trick has a lead suit");
    let following: Vec<Card> = hand.iter().copied().filter(|c| c.suit == lead).collect();
    if !following.is_empty() {
        return following;
    }

    // Void in the lead suit: any discard, minus first-trick penalties.
    if first_trick && !hand.all_penalties() {
        return hand.iter().copied().filter(|c| !c.is_penalty()).collect();
    }
    hand.cards().to_vec()
}

fn legal_leads(hand: &Hand, hearts_broken: bool, first_trick: bool) -> Vec<Card> {
    if first_trick {
        if hand.contains(Card::TWO_OF_CLUBS) {
            return vec![Card::TWO_OF_CLUBS];
        }
        // A first-trick leader without 2C cannot happen under a correct
        // deal; degrade to non-point leads like any other first-trick play.
        if !hand.all_penalties() {
            return hand.iter().copied().filter(|c| !c.is_penalty()).collect();
        }
        return hand.cards().to_vec();
    }

    if !hearts_broken && !hand.all_hearts() {
        return hand.iter().copied().filter(|c| !c.suit.is_heart()).collect();
    }
    hand.cards().to_vec()
}

/// Deterministic stand-in when a strategy returns a card outside the legal
/// set: the smallest legal card by encoded byte.
pub fn fallback_card(legal: &[Card]) -> Option<Card> {
    legal.iter().copied().min()
}
