use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Split into four 13-card hands: node i receives cards 13i..13(i+1).
    pub fn deal(&self) -> [Hand; 4] {
        std::array::from_fn(|i| Hand::with_cards(self.cards[i * 13..(i + 1) * 13].to_vec()))
    }
}
