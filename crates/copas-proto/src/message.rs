use crate::frame::MsgKind;
use copas_core::model::card::Card;
use copas_core::model::direction::PassDirection;
use copas_core::model::node::NodeId;
use thiserror::Error;

/// HAND_SUMMARY shooter byte when nobody shot the moon.
const NO_SHOOTER: u8 = 0xFF;

/// Typed view of every payload in the catalog. `Message::decode` pairs a
/// [`MsgKind`] with its payload bytes; `encode_payload` is the inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Unicast to the new bearer; the payload repeats the bearer id.
    TokenPass { bearer: NodeId },
    /// Broadcast; opens a hand.
    GameStart,
    /// Unicast; the receiver's 13 cards.
    DealHand { cards: Vec<Card> },
    /// Broadcast; announces the pass phase (with its direction) or the
    /// tricks phase.
    StartPhase(StartPhase),
    /// Unicast to the pass target; three cards leaving the origin's hand.
    PassCards { cards: [Card; 3] },
    /// Broadcast; one card entering the current trick.
    PlayCard { card: Card },
    /// Broadcast by the coordinator; the four plays in temporal order.
    TrickSummary {
        winner: NodeId,
        plays: [(NodeId, Card); 4],
        points: u8,
    },
    /// Broadcast by the coordinator after the 13th trick.
    HandSummary {
        hand_scores: [u8; 4],
        totals: [u8; 4],
        shooter: Option<NodeId>,
    },
    /// Broadcast by the coordinator; ends the game.
    GameOver { winner: NodeId, totals: [u8; 4] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPhase {
    Passing(PassDirection),
    Playing,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("{kind} payload must be {expected} bytes, got {got}")]
    WrongLength {
        kind: MsgKind,
        expected: usize,
        got: usize,
    },
    #[error("byte {0:#04x} is not a card")]
    BadCard(u8),
    #[error("byte {0:#04x} is not a node id")]
    BadNode(u8),
    #[error("byte {0:#04x} is not a pass direction")]
    BadDirection(u8),
    #[error("byte {0:#04x} is not a phase code")]
    BadPhase(u8),
}

impl Message {
    pub fn kind(&self) -> MsgKind {
        match self {
            Message::TokenPass { .. } => MsgKind::TokenPass,
            Message::GameStart => MsgKind::GameStart,
            Message::DealHand { .. } => MsgKind::DealHand,
            Message::StartPhase(_) => MsgKind::StartPhase,
            Message::PassCards { .. } => MsgKind::PassCards,
            Message::PlayCard { .. } => MsgKind::PlayCard,
            Message::TrickSummary { .. } => MsgKind::TrickSummary,
            Message::HandSummary { .. } => MsgKind::HandSummary,
            Message::GameOver { .. } => MsgKind::GameOver,
        }
    }

    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Message::TokenPass { bearer } => vec![bearer.wire()],
            Message::GameStart => Vec::new(),
            Message::DealHand { cards } => cards.iter().map(|c| c.encode()).collect(),
            Message::StartPhase(StartPhase::Passing(direction)) => vec![0, direction.wire()],
            Message::StartPhase(StartPhase::Playing) => vec![1],
            Message::PassCards { cards } => cards.iter().map(|c| c.encode()).collect(),
            Message::PlayCard { card } => vec![card.encode()],
            Message::TrickSummary {
                winner,
                plays,
                points,
            } => {
                let mut bytes = Vec::with_capacity(10);
                bytes.push(winner.wire());
                for (node, card) in plays {
                    bytes.push(node.wire());
                    bytes.push(card.encode());
                }
                bytes.push(*points);
                bytes
            }
            Message::HandSummary {
                hand_scores,
                totals,
                shooter,
            } => {
                let mut bytes = Vec::with_capacity(9);
                bytes.extend_from_slice(hand_scores);
                bytes.extend_from_slice(totals);
                bytes.push(shooter.map_or(NO_SHOOTER, NodeId::wire));
                bytes
            }
            Message::GameOver { winner, totals } => {
                let mut bytes = Vec::with_capacity(5);
                bytes.push(winner.wire());
                bytes.extend_from_slice(totals);
                bytes
            }
        }
    }

    pub fn decode(kind: MsgKind, payload: &[u8]) -> Result<Self, PayloadError> {
        match kind {
            MsgKind::TokenPass => {
                expect_len(kind, payload, 1)?;
                Ok(Message::TokenPass {
                    bearer: node(payload[0])?,
                })
            }
            MsgKind::GameStart => {
                expect_len(kind, payload, 0)?;
                Ok(Message::GameStart)
            }
            MsgKind::DealHand => {
                expect_len(kind, payload, 13)?;
                let cards = payload
                    .iter()
                    .map(|&b| card(b))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Message::DealHand { cards })
            }
            MsgKind::StartPhase => match payload {
                [0, dir] => {
                    let direction = PassDirection::from_wire(*dir)
                        .ok_or(PayloadError::BadDirection(*dir))?;
                    Ok(Message::StartPhase(StartPhase::Passing(direction)))
                }
                [1] => Ok(Message::StartPhase(StartPhase::Playing)),
                [phase, ..] if *phase > 1 => Err(PayloadError::BadPhase(*phase)),
                other => Err(PayloadError::WrongLength {
                    kind,
                    expected: if other.first() == Some(&1) { 1 } else { 2 },
                    got: other.len(),
                }),
            },
            MsgKind::PassCards => {
                expect_len(kind, payload, 3)?;
                Ok(Message::PassCards {
                    cards: [card(payload[0])?, card(payload[1])?, card(payload[2])?],
                })
            }
            MsgKind::PlayCard => {
                expect_len(kind, payload, 1)?;
                Ok(Message::PlayCard {
                    card: card(payload[0])?,
                })
            }
            MsgKind::TrickSummary => {
                expect_len(kind, payload, 10)?;
                let winner = node(payload[0])?;
                let mut plays = [(NodeId::P0, Card::TWO_OF_CLUBS); 4];
                for (i, pair) in payload[1..9].chunks_exact(2).enumerate() {
                    plays[i] = (node(pair[0])?, card(pair[1])?);
                }
                Ok(Message::TrickSummary {
                    winner,
                    plays,
                    points: payload[9],
                })
            }
            MsgKind::HandSummary => {
                expect_len(kind, payload, 9)?;
                let mut hand_scores = [0u8; 4];
                hand_scores.copy_from_slice(&payload[0..4]);
                let mut totals = [0u8; 4];
                totals.copy_from_slice(&payload[4..8]);
                let shooter = match payload[8] {
                    NO_SHOOTER => None,
                    byte => Some(node(byte)?),
                };
                Ok(Message::HandSummary {
                    hand_scores,
                    totals,
                    shooter,
                })
            }
            MsgKind::GameOver => {
                expect_len(kind, payload, 5)?;
                let mut totals = [0u8; 4];
                totals.copy_from_slice(&payload[1..5]);
                Ok(Message::GameOver {
                    winner: node(payload[0])?,
                    totals,
                })
            }
        }
    }
}

fn expect_len(kind: MsgKind, payload: &[u8], expected: usize) -> Result<(), PayloadError> {
    if payload.len() != expected {
        return Err(PayloadError::WrongLength {
            kind,
            expected,
            got: payload.len(),
        });
    }
    Ok(())
}

fn node(byte: u8) -> Result<NodeId, PayloadError> {
    NodeId::from_wire(byte).ok_or(PayloadError::BadNode(byte))
}

fn card(byte: u8) -> Result<Card, PayloadError> {
    Card::decode(byte).ok_or(PayloadError::BadCard(byte))
}

#[cfg(test)]
mod tests {
    use super::{Message, PayloadError, StartPhase};
    use crate::frame::MsgKind;
    use copas_core::model::card::Card;
    use copas_core::model::direction::PassDirection;
    use copas_core::model::node::NodeId;
    use copas_core::model::rank::Rank;
    use copas_core::model::suit::Suit;

    fn roundtrip(message: Message) {
        let payload = message.encode_payload();
        let decoded = Message::decode(message.kind(), &payload).expect("decode");
        assert_eq!(decoded, message);
    }

    #[test]
    fn every_message_roundtrips() {
        roundtrip(Message::TokenPass { bearer: NodeId::P3 });
        roundtrip(Message::GameStart);
        roundtrip(Message::DealHand {
            cards: Suit::ALL
                .iter()
                .flat_map(|&s| {
                    [Rank::Two, Rank::Five, Rank::Nine]
                        .into_iter()
                        .map(move |r| Card::new(r, s))
                })
                .chain([Card::QUEEN_OF_SPADES])
                .collect(),
        });
        roundtrip(Message::StartPhase(StartPhase::Passing(
            PassDirection::Across,
        )));
        roundtrip(Message::StartPhase(StartPhase::Playing));
        roundtrip(Message::PassCards {
            cards: [
                Card::new(Rank::Ace, Suit::Hearts),
                Card::new(Rank::King, Suit::Hearts),
                Card::QUEEN_OF_SPADES,
            ],
        });
        roundtrip(Message::PlayCard {
            card: Card::TWO_OF_CLUBS,
        });
        roundtrip(Message::TrickSummary {
            winner: NodeId::P2,
            plays: [
                (NodeId::P2, Card::TWO_OF_CLUBS),
                (NodeId::P3, Card::new(Rank::Nine, Suit::Clubs)),
                (NodeId::P0, Card::new(Rank::Ace, Suit::Clubs)),
                (NodeId::P1, Card::new(Rank::Four, Suit::Hearts)),
            ],
            points: 1,
        });
        roundtrip(Message::HandSummary {
            hand_scores: [1, 5, 0, 20],
            totals: [14, 30, 2, 51],
            shooter: None,
        });
        roundtrip(Message::HandSummary {
            hand_scores: [26, 26, 0, 26],
            totals: [26, 26, 0, 26],
            shooter: Some(NodeId::P2),
        });
        roundtrip(Message::GameOver {
            winner: NodeId::P1,
            totals: [102, 55, 61, 80],
        });
    }

    #[test]
    fn start_phase_passing_carries_its_direction() {
        let message = Message::StartPhase(StartPhase::Passing(PassDirection::Left));
        assert_eq!(message.encode_payload(), vec![0, 0]);
        let message = Message::StartPhase(StartPhase::Playing);
        assert_eq!(message.encode_payload(), vec![1]);
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        assert!(matches!(
            Message::decode(MsgKind::DealHand, &[0x12; 12]),
            Err(PayloadError::WrongLength { .. })
        ));
        assert!(matches!(
            Message::decode(MsgKind::TokenPass, &[]),
            Err(PayloadError::WrongLength { .. })
        ));
        assert!(matches!(
            Message::decode(MsgKind::StartPhase, &[0]),
            Err(PayloadError::WrongLength { .. })
        ));
    }

    #[test]
    fn bad_bytes_are_rejected() {
        assert_eq!(
            Message::decode(MsgKind::PlayCard, &[0x00]),
            Err(PayloadError::BadCard(0x00))
        );
        assert_eq!(
            Message::decode(MsgKind::TokenPass, &[7]),
            Err(PayloadError::BadNode(7))
        );
        assert_eq!(
            Message::decode(MsgKind::StartPhase, &[0, 9]),
            Err(PayloadError::BadDirection(9))
        );
        assert_eq!(
            Message::decode(MsgKind::StartPhase, &[2]),
            Err(PayloadError::BadPhase(2))
        );
    }

    #[test]
    fn hand_summary_shooter_byte_is_0xff_when_absent() {
        let message = Message::HandSummary {
            hand_scores: [6, 7, 13, 0],
            totals: [6, 7, 13, 0],
            shooter: None,
        };
        assert_eq!(message.encode_payload()[8], 0xFF);
    }
}
