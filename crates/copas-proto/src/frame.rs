use copas_core::model::node::NodeId;
use core::fmt;
use thiserror::Error;

/// Fixed header: `type | origin | destination | seq | payload_len`.
pub const HEADER_LEN: usize = 5;
/// Destination byte meaning "every node processes this".
pub const BROADCAST_ID: u8 = 0xFF;
/// `payload_len` is a single byte, so payloads cap at 255.
pub const MAX_PAYLOAD: usize = 255;

/// Message type codes 0x01..=0x09.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MsgKind {
    TokenPass = 0x01,
    GameStart = 0x02,
    DealHand = 0x03,
    StartPhase = 0x04,
    PassCards = 0x05,
    PlayCard = 0x06,
    TrickSummary = 0x07,
    HandSummary = 0x08,
    GameOver = 0x09,
}

impl MsgKind {
    pub const fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(MsgKind::TokenPass),
            0x02 => Some(MsgKind::GameStart),
            0x03 => Some(MsgKind::DealHand),
            0x04 => Some(MsgKind::StartPhase),
            0x05 => Some(MsgKind::PassCards),
            0x06 => Some(MsgKind::PlayCard),
            0x07 => Some(MsgKind::TrickSummary),
            0x08 => Some(MsgKind::HandSummary),
            0x09 => Some(MsgKind::GameOver),
            _ => None,
        }
    }

    pub const fn wire(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MsgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MsgKind::TokenPass => "TOKEN_PASS",
            MsgKind::GameStart => "GAME_START",
            MsgKind::DealHand => "DEAL_HAND",
            MsgKind::StartPhase => "START_PHASE",
            MsgKind::PassCards => "PASS_CARDS",
            MsgKind::PlayCard => "PLAY_CARD",
            MsgKind::TrickSummary => "TRICK_SUMMARY",
            MsgKind::HandSummary => "HAND_SUMMARY",
            MsgKind::GameOver => "GAME_OVER",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dest {
    Node(NodeId),
    Broadcast,
}

impl Dest {
    pub const fn from_wire(byte: u8) -> Option<Self> {
        if byte == BROADCAST_ID {
            return Some(Dest::Broadcast);
        }
        match NodeId::from_wire(byte) {
            Some(node) => Some(Dest::Node(node)),
            None => None,
        }
    }

    pub const fn wire(self) -> u8 {
        match self {
            Dest::Node(node) => node.wire(),
            Dest::Broadcast => BROADCAST_ID,
        }
    }

    pub fn is_for(self, node: NodeId) -> bool {
        matches!(self, Dest::Broadcast) || self == Dest::Node(node)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: MsgKind,
    pub origin: NodeId,
    pub dest: Dest,
    pub seq: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: Header,
    pub payload: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame of {got} bytes is shorter than the {HEADER_LEN}-byte header")]
    Truncated { got: usize },
    #[error("declared payload of {declared} bytes but {got} bytes follow the header")]
    LengthMismatch { declared: usize, got: usize },
    #[error("unknown message type {0:#04x}")]
    UnknownKind(u8),
    #[error("invalid origin id {0:#04x}")]
    BadOrigin(u8),
    #[error("invalid destination id {0:#04x}")]
    BadDest(u8),
    #[error("payload of {0} bytes exceeds the single-byte length field")]
    PayloadTooLong(usize),
}

impl Frame {
    pub fn new(header: Header, payload: Vec<u8>) -> Self {
        debug_assert!(payload.len() <= MAX_PAYLOAD);
        Self { header, payload }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.payload.len());
        bytes.push(self.header.kind.wire());
        bytes.push(self.header.origin.wire());
        bytes.push(self.header.dest.wire());
        bytes.push(self.header.seq);
        bytes.push(self.payload.len() as u8);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// A datagram carries exactly one frame, so the declared length must
    /// match the remaining bytes exactly.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < HEADER_LEN {
            return Err(FrameError::Truncated { got: bytes.len() });
        }
        let kind = MsgKind::from_wire(bytes[0]).ok_or(FrameError::UnknownKind(bytes[0]))?;
        let origin = NodeId::from_wire(bytes[1]).ok_or(FrameError::BadOrigin(bytes[1]))?;
        let dest = Dest::from_wire(bytes[2]).ok_or(FrameError::BadDest(bytes[2]))?;
        let seq = bytes[3];
        let declared = bytes[4] as usize;
        let got = bytes.len() - HEADER_LEN;
        if declared != got {
            return Err(FrameError::LengthMismatch { declared, got });
        }
        Ok(Self {
            header: Header {
                kind,
                origin,
                dest,
                seq,
            },
            payload: bytes[HEADER_LEN..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Dest, Frame, FrameError, Header, MsgKind, BROADCAST_ID};
    use copas_core::model::node::NodeId;

    fn frame(kind: MsgKind, payload: Vec<u8>) -> Frame {
        Frame::new(
            Header {
                kind,
                origin: NodeId::P1,
                dest: Dest::Broadcast,
                seq: 9,
            },
            payload,
        )
    }

    #[test]
    fn encode_lays_out_the_header() {
        let bytes = frame(MsgKind::PlayCard, vec![0x12]).encode();
        assert_eq!(bytes, vec![0x06, 0x01, BROADCAST_ID, 0x09, 0x01, 0x12]);
    }

    #[test]
    fn decode_roundtrips_every_kind() {
        for (kind, payload) in [
            (MsgKind::TokenPass, vec![2u8]),
            (MsgKind::GameStart, vec![]),
            (MsgKind::DealHand, vec![0x12; 13]),
            (MsgKind::StartPhase, vec![0, 1]),
            (MsgKind::PassCards, vec![0x11, 0x12, 0x13]),
            (MsgKind::PlayCard, vec![0x3C]),
            (MsgKind::TrickSummary, vec![0; 10]),
            (MsgKind::HandSummary, vec![0; 9]),
            (MsgKind::GameOver, vec![0; 5]),
        ] {
            let original = frame(kind, payload);
            let decoded = Frame::decode(&original.encode()).expect("decode");
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn short_frames_are_rejected() {
        assert_eq!(
            Frame::decode(&[0x06, 0x01, 0xFF, 0x00]),
            Err(FrameError::Truncated { got: 4 })
        );
    }

    #[test]
    fn length_mismatch_is_rejected() {
        // Declares two payload bytes, carries one.
        assert_eq!(
            Frame::decode(&[0x06, 0x01, 0xFF, 0x00, 0x02, 0x12]),
            Err(FrameError::LengthMismatch {
                declared: 2,
                got: 1
            })
        );
        // Declares none, carries one.
        assert_eq!(
            Frame::decode(&[0x06, 0x01, 0xFF, 0x00, 0x00, 0x12]),
            Err(FrameError::LengthMismatch {
                declared: 0,
                got: 1
            })
        );
    }

    #[test]
    fn invalid_ids_are_rejected() {
        assert_eq!(
            Frame::decode(&[0x00, 0x01, 0xFF, 0x00, 0x00]),
            Err(FrameError::UnknownKind(0x00))
        );
        assert_eq!(
            Frame::decode(&[0x0A, 0x01, 0xFF, 0x00, 0x00]),
            Err(FrameError::UnknownKind(0x0A))
        );
        assert_eq!(
            Frame::decode(&[0x06, 0x04, 0xFF, 0x00, 0x00]),
            Err(FrameError::BadOrigin(0x04))
        );
        assert_eq!(
            Frame::decode(&[0x06, 0x01, 0x05, 0x00, 0x00]),
            Err(FrameError::BadDest(0x05))
        );
    }

    #[test]
    fn dest_filtering() {
        assert!(Dest::Broadcast.is_for(NodeId::P2));
        assert!(Dest::Node(NodeId::P2).is_for(NodeId::P2));
        assert!(!Dest::Node(NodeId::P2).is_for(NodeId::P3));
    }
}
