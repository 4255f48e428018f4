use core::fmt;

/// Rank codes match the wire nibble (bits 0-3 of an encoded card): the Ace
/// is 1 on the wire but ranks highest when tricks are compared, which is
/// what [`Rank::strength`] is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Rank {
    Ace = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Rank::Ace),
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Comparison value inside a trick: Ace beats King.
    pub const fn strength(self) -> u8 {
        match self {
            Rank::Ace => 14,
            other => other as u8,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn from_code_maps() {
        assert_eq!(Rank::from_code(1), Some(Rank::Ace));
        assert_eq!(Rank::from_code(13), Some(Rank::King));
        assert_eq!(Rank::from_code(0), None);
        assert_eq!(Rank::from_code(14), None);
    }

    #[test]
    fn ace_is_strongest() {
        assert!(Rank::Ace.strength() > Rank::King.strength());
        assert_eq!(Rank::Two.strength(), 2);
    }

    #[test]
    fn display_matches_symbols() {
        assert_eq!(Rank::Ace.to_string(), "A");
        assert_eq!(Rank::Ten.to_string(), "10");
    }
}
