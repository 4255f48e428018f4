use crate::model::node::NodeId;

/// Per-hand and cumulative penalty points for the four nodes. The
/// coordinator owns the authoritative copy; the other nodes mirror it from
/// TRICK_SUMMARY and HAND_SUMMARY broadcasts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    hand: [u8; 4],
    totals: [u16; 4],
}

/// Result of closing a hand: the per-hand scores after any shoot-the-moon
/// adjustment, the new cumulative totals, and the shooter if there was one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandOutcome {
    pub hand_scores: [u8; 4],
    pub totals: [u16; 4],
    pub shooter: Option<NodeId>,
}

impl ScoreBoard {
    pub const fn new() -> Self {
        Self {
            hand: [0; 4],
            totals: [0; 4],
        }
    }

    pub fn add_trick(&mut self, winner: NodeId, points: u8) {
        self.hand[winner.index()] = self.hand[winner.index()].saturating_add(points);
    }

    pub fn hand_scores(&self) -> [u8; 4] {
        self.hand
    }

    pub fn totals(&self) -> [u16; 4] {
        self.totals
    }

    pub fn total(&self, node: NodeId) -> u16 {
        self.totals[node.index()]
    }

    /// Apply the moon adjustment, fold the hand into the totals and reset
    /// the per-hand counters.
    pub fn finish_hand(&mut self) -> HandOutcome {
        let shooter = NodeId::RING
            .into_iter()
            .find(|node| self.hand[node.index()] == 26);

        let mut hand_scores = self.hand;
        if let Some(shooter) = shooter {
            for node in NodeId::RING {
                hand_scores[node.index()] = if node == shooter { 0 } else { 26 };
            }
        }

        for node in NodeId::RING {
            self.totals[node.index()] += u16::from(hand_scores[node.index()]);
        }
        self.hand = [0; 4];

        HandOutcome {
            hand_scores,
            totals: self.totals,
            shooter,
        }
    }

    /// Overwrite the cumulative totals with the coordinator's HAND_SUMMARY
    /// view and reset the per-hand counters for the next hand.
    pub fn adopt_summary(&mut self, totals: [u8; 4]) {
        self.hand = [0; 4];
        self.totals = totals.map(u16::from);
    }

    pub fn reset_hand(&mut self) {
        self.hand = [0; 4];
    }

    pub fn reached(&self, limit: u16) -> bool {
        self.totals.iter().any(|&t| t >= limit)
    }

    /// Lowest total wins; ties break to the lowest id.
    pub fn leader(&self) -> NodeId {
        NodeId::RING
            .into_iter()
            .min_by_key(|node| self.totals[node.index()])
            .unwrap_or(NodeId::P0)
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreBoard;
    use crate::model::node::NodeId;

    #[test]
    fn trick_points_accumulate_per_hand() {
        let mut board = ScoreBoard::new();
        board.add_trick(NodeId::P2, 5);
        board.add_trick(NodeId::P2, 8);
        board.add_trick(NodeId::P0, 13);
        assert_eq!(board.hand_scores(), [13, 0, 13, 0]);
    }

    #[test]
    fn normal_hand_sums_to_26() {
        let mut board = ScoreBoard::new();
        board.add_trick(NodeId::P0, 1);
        board.add_trick(NodeId::P1, 5);
        board.add_trick(NodeId::P3, 20);
        let outcome = board.finish_hand();
        assert_eq!(outcome.shooter, None);
        assert_eq!(outcome.hand_scores, [1, 5, 0, 20]);
        assert_eq!(outcome.hand_scores.iter().map(|&p| u16::from(p)).sum::<u16>(), 26);
        assert_eq!(board.totals(), [1, 5, 0, 20]);
        assert_eq!(board.hand_scores(), [0; 4]);
    }

    #[test]
    fn shooting_the_moon_inverts_the_hand() {
        let mut board = ScoreBoard::new();
        board.add_trick(NodeId::P2, 26);
        let outcome = board.finish_hand();
        assert_eq!(outcome.shooter, Some(NodeId::P2));
        assert_eq!(outcome.hand_scores, [26, 26, 0, 26]);
        assert_eq!(board.totals(), [26, 26, 0, 26]);
    }

    #[test]
    fn leader_is_lowest_total_with_lowest_id_tiebreak() {
        let mut board = ScoreBoard::new();
        board.add_trick(NodeId::P0, 10);
        board.add_trick(NodeId::P3, 16);
        board.finish_hand();
        // P1 and P2 both sit on zero; the lower id wins the tie.
        assert_eq!(board.leader(), NodeId::P1);
    }

    #[test]
    fn reached_checks_the_limit() {
        let mut board = ScoreBoard::new();
        assert!(!board.reached(100));
        for _ in 0..4 {
            board.add_trick(NodeId::P1, 26);
            board.finish_hand();
        }
        assert!(board.reached(100));
    }

    #[test]
    fn adopt_summary_mirrors_the_coordinator() {
        let mut board = ScoreBoard::new();
        board.add_trick(NodeId::P0, 3);
        board.adopt_summary([11, 25, 30, 40]);
        assert_eq!(board.totals(), [11, 25, 30, 40]);
        assert_eq!(board.hand_scores(), [0; 4]);
    }
}
