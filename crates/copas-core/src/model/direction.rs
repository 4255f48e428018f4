use crate::model::node::NodeId;
use core::fmt;

/// Pass direction for a hand, cycling Left -> Right -> Across -> Hold and
/// back to Left. Codes match the START_PHASE payload byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PassDirection {
    Left = 0,
    Right = 1,
    Across = 2,
    Hold = 3,
}

impl PassDirection {
    pub const CYCLE: [PassDirection; 4] = [
        PassDirection::Left,
        PassDirection::Right,
        PassDirection::Across,
        PassDirection::Hold,
    ];

    pub const fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(PassDirection::Left),
            1 => Some(PassDirection::Right),
            2 => Some(PassDirection::Across),
            3 => Some(PassDirection::Hold),
            _ => None,
        }
    }

    pub const fn wire(self) -> u8 {
        self as u8
    }

    pub const fn next(self) -> PassDirection {
        match self {
            PassDirection::Left => PassDirection::Right,
            PassDirection::Right => PassDirection::Across,
            PassDirection::Across => PassDirection::Hold,
            PassDirection::Hold => PassDirection::Left,
        }
    }

    pub const fn requires_pass(self) -> bool {
        !matches!(self, PassDirection::Hold)
    }

    /// Which node receives the three cards this node passes.
    pub const fn target(self, node: NodeId) -> NodeId {
        match self {
            PassDirection::Left => node.successor(),
            PassDirection::Right => node.predecessor(),
            PassDirection::Across => node.across(),
            PassDirection::Hold => node,
        }
    }
}

impl fmt::Display for PassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PassDirection::Left => "Left",
            PassDirection::Right => "Right",
            PassDirection::Across => "Across",
            PassDirection::Hold => "Hold",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::PassDirection;
    use crate::model::node::NodeId;

    #[test]
    fn cycle_wraps_past_hold() {
        assert_eq!(PassDirection::Hold.next(), PassDirection::Left);
        assert_eq!(PassDirection::Left.next(), PassDirection::Right);
    }

    #[test]
    fn targets_follow_the_ring() {
        assert_eq!(PassDirection::Left.target(NodeId::P0), NodeId::P1);
        assert_eq!(PassDirection::Right.target(NodeId::P0), NodeId::P3);
        assert_eq!(PassDirection::Across.target(NodeId::P1), NodeId::P3);
        assert_eq!(PassDirection::Hold.target(NodeId::P2), NodeId::P2);
    }

    #[test]
    fn wire_roundtrip() {
        for dir in PassDirection::CYCLE {
            assert_eq!(PassDirection::from_wire(dir.wire()), Some(dir));
        }
        assert_eq!(PassDirection::from_wire(4), None);
    }
}
