use copas_core::model::card::Card;
use copas_core::model::deck::Deck;
use copas_core::model::direction::PassDirection;
use copas_core::model::hand::Hand;
use copas_core::model::node::NodeId;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use tracing::debug;

/// P0-only state: the authoritative deal, the pass barrier, and the pass
/// direction cycle. The coordinator knows every hand at deal time and
/// follows card movement through the pass by reading the tapped PASS_CARDS
/// payloads, which is how it locates the two of clubs for the first trick.
pub struct Coordinator {
    rng: StdRng,
    scripted: VecDeque<[Vec<Card>; 4]>,
    hands: [Hand; 4],
    passes_seen: [bool; 4],
    direction: PassDirection,
}

impl Coordinator {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        debug!(seed, "coordinator seeded");
        Self {
            rng: StdRng::seed_from_u64(seed),
            scripted: VecDeque::new(),
            hands: std::array::from_fn(|_| Hand::new()),
            passes_seen: [false; 4],
            direction: PassDirection::CYCLE[0],
        }
    }

    /// Queue a fixed deal to be used before any shuffling. Test harnesses
    /// use this to contrive hands.
    pub fn script_deal(&mut self, hands: [Vec<Card>; 4]) {
        self.scripted.push_back(hands);
    }

    pub fn direction(&self) -> PassDirection {
        self.direction
    }

    /// Rotate the pass direction for the hand about to start.
    pub fn advance_hand(&mut self) {
        self.direction = self.direction.next();
    }

    /// Produce the four 13-card hands for DEAL_HAND and remember them as
    /// the authoritative view. Resets the pass barrier.
    pub fn deal(&mut self) -> [Vec<Card>; 4] {
        let dealt: [Vec<Card>; 4] = match self.scripted.pop_front() {
            Some(hands) => hands,
            None => {
                let deck = Deck::shuffled(&mut self.rng);
                deck.deal().map(|hand| hand.cards().to_vec())
            }
        };
        self.hands = dealt.clone().map(Hand::with_cards);
        self.passes_seen = [false; 4];
        dealt
    }

    /// Track three cards moving between hands, from a tapped PASS_CARDS
    /// frame or from the coordinator's own pass.
    pub fn note_pass(&mut self, origin: NodeId, dest: NodeId, cards: &[Card; 3]) {
        for card in cards {
            self.hands[origin.index()].remove(*card);
        }
        for card in cards {
            self.hands[dest.index()].add(*card);
        }
    }

    /// Mark one origin's PASS_CARDS as observed; returns true exactly once,
    /// when the fourth origin completes the barrier.
    pub fn mark_pass_seen(&mut self, origin: NodeId) -> bool {
        if self.passes_seen[origin.index()] {
            return false;
        }
        self.passes_seen[origin.index()] = true;
        self.passes_seen.iter().all(|&seen| seen)
    }

    /// Whoever currently holds 2C leads the first trick.
    pub fn two_clubs_holder(&self) -> NodeId {
        NodeId::RING
            .into_iter()
            .find(|node| self.hands[node.index()].contains(Card::TWO_OF_CLUBS))
            .unwrap_or(NodeId::COORDINATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::Coordinator;
    use copas_core::model::card::Card;
    use copas_core::model::direction::PassDirection;
    use copas_core::model::node::NodeId;
    use std::collections::HashSet;

    #[test]
    fn deal_covers_the_deck_and_locates_two_of_clubs() {
        let mut coord = Coordinator::new(Some(11));
        let hands = coord.deal();
        let mut seen = HashSet::new();
        for hand in &hands {
            assert_eq!(hand.len(), 13);
            for card in hand {
                assert!(seen.insert(card.encode()));
            }
        }
        assert_eq!(seen.len(), 52);

        let holder = coord.two_clubs_holder();
        assert!(hands[holder.index()].contains(&Card::TWO_OF_CLUBS));
    }

    #[test]
    fn pass_tracking_follows_the_two_of_clubs() {
        let mut coord = Coordinator::new(Some(11));
        let hands = coord.deal();
        let holder = coord.two_clubs_holder();

        // Move 2C (plus two fillers) one seat to the left.
        let fillers: Vec<Card> = hands[holder.index()]
            .iter()
            .filter(|&&c| c != Card::TWO_OF_CLUBS)
            .take(2)
            .copied()
            .collect();
        let moved = [Card::TWO_OF_CLUBS, fillers[0], fillers[1]];
        coord.note_pass(holder, holder.successor(), &moved);

        assert_eq!(coord.two_clubs_holder(), holder.successor());
    }

    #[test]
    fn barrier_completes_exactly_once() {
        let mut coord = Coordinator::new(Some(3));
        coord.deal();
        assert!(!coord.mark_pass_seen(NodeId::P0));
        assert!(!coord.mark_pass_seen(NodeId::P1));
        assert!(!coord.mark_pass_seen(NodeId::P1), "repeat does not re-arm");
        assert!(!coord.mark_pass_seen(NodeId::P2));
        assert!(coord.mark_pass_seen(NodeId::P3));
        assert!(!coord.mark_pass_seen(NodeId::P3));
    }

    #[test]
    fn direction_cycles_per_hand() {
        let mut coord = Coordinator::new(None);
        assert_eq!(coord.direction(), PassDirection::Left);
        coord.advance_hand();
        assert_eq!(coord.direction(), PassDirection::Right);
        coord.advance_hand();
        coord.advance_hand();
        assert_eq!(coord.direction(), PassDirection::Hold);
        coord.advance_hand();
        assert_eq!(coord.direction(), PassDirection::Left);
    }

    #[test]
    fn scripted_deals_take_priority() {
        use copas_core::model::rank::Rank;
        use copas_core::model::suit::Suit;

        // One full suit per node.
        let fixed: [Vec<Card>; 4] = [Suit::Diamonds, Suit::Clubs, Suit::Hearts, Suit::Spades]
            .map(|suit| Rank::ALL.iter().map(|&r| Card::new(r, suit)).collect());
        let mut coord = Coordinator::new(Some(5));
        coord.script_deal(fixed.clone());
        let dealt = coord.deal();
        assert_eq!(dealt, fixed);
        assert_eq!(coord.two_clubs_holder(), NodeId::P1);
        // The next deal falls back to shuffling.
        let shuffled = coord.deal();
        assert_ne!(shuffled, fixed);
    }
}
