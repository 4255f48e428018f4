use copas_core::model::card::Card;
use copas_core::model::direction::PassDirection;
use copas_core::model::hand::Hand;
use copas_core::model::trick::Trick;

/// Context handed to a strategy when three cards must be chosen to pass.
pub struct PassView<'a> {
    pub hand: &'a Hand,
    pub direction: PassDirection,
}

/// Context handed to a strategy when one card must be chosen to play.
/// `legal` is never empty and the pick must come from it; the node
/// substitutes deterministically if it does not.
pub struct PlayView<'a> {
    pub hand: &'a Hand,
    pub legal: &'a [Card],
    pub trick: &'a Trick,
    pub hearts_broken: bool,
}

/// Card-selection seam. Implementations may block (a human prompt, an
/// async decision); the node treats every result as untrusted.
pub trait Strategy {
    fn choose_pass(&mut self, view: &PassView<'_>) -> [Card; 3];

    fn choose_play(&mut self, view: &PlayView<'_>) -> Card;
}
