use copas_core::model::node::NodeId;
use copas_proto::{Frame, Header, MsgKind};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;
use tracing::{debug, trace};

const RECV_BUFFER: usize = 512;
const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// What the ring does with an inbound frame. Local processing always
/// happens before forwarding so downstream peers cannot race ahead of this
/// node's state update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Own frame back after a full lap: consume, never forward.
    Lap,
    /// Addressed here (unicast or broadcast): process, then forward.
    DeliverAndForward,
    /// Someone else's unicast: forward unchanged, ignore locally.
    ForwardOnly,
}

/// The ring-consumption rule as a pure function. The coordinator
/// additionally taps every transiting PASS_CARDS frame: that is how P0
/// observes the pass barrier and follows the two of clubs through a pass.
pub fn route(self_id: NodeId, header: &Header) -> Disposition {
    if header.origin == self_id {
        return Disposition::Lap;
    }
    if header.dest.is_for(self_id)
        || (self_id.is_coordinator() && header.kind == MsgKind::PassCards)
    {
        return Disposition::DeliverAndForward;
    }
    Disposition::ForwardOnly
}

/// Process-once guard keyed by `(origin, seq, type)`. Origin consumption
/// makes duplicates impossible on a healthy ring; this catches the
/// unhealthy one.
#[derive(Debug, Default)]
pub struct RingFilter {
    last_seen: [Option<(u8, MsgKind)>; 4],
}

impl RingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the frame and reports whether it was already seen.
    pub fn is_duplicate(&mut self, header: &Header) -> bool {
        let slot = &mut self.last_seen[header.origin.index()];
        if *slot == Some((header.seq, header.kind)) {
            return true;
        }
        *slot = Some((header.seq, header.kind));
        false
    }
}

/// A decoded inbound frame plus the untouched bytes to forward.
#[derive(Debug)]
pub struct Received {
    pub frame: Frame,
    pub raw: Vec<u8>,
    pub disposition: Disposition,
}

/// One UDP socket, one successor. The transport owns the socket; there is
/// exactly one reader and writer per peer, so no locking.
pub struct RingTransport {
    socket: UdpSocket,
    successor: SocketAddr,
    self_id: NodeId,
    filter: RingFilter,
}

impl RingTransport {
    pub fn bind(self_id: NodeId, listen: SocketAddr, successor: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(listen)?;
        socket.set_read_timeout(Some(RECV_TIMEOUT))?;
        debug!(%self_id, %listen, %successor, "ring transport bound");
        Ok(Self {
            socket,
            successor,
            self_id,
            filter: RingFilter::new(),
        })
    }

    /// Block up to the receive timeout for one frame. Returns `None` on
    /// timeout and on frames the ring discards (malformed, duplicate).
    pub fn recv(&mut self) -> io::Result<Option<Received>> {
        let mut buf = [0u8; RECV_BUFFER];
        let (len, from) = match self.socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err)
                if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
            {
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let raw = buf[..len].to_vec();
        trace!(%from, bytes = len, "datagram in");

        let frame = match Frame::decode(&raw) {
            Ok(frame) => frame,
            Err(err) => {
                debug!(%from, %err, "dropping malformed frame");
                return Ok(None);
            }
        };

        if self.filter.is_duplicate(&frame.header) {
            debug!(
                origin = %frame.header.origin,
                seq = frame.header.seq,
                kind = %frame.header.kind,
                "dropping duplicate frame"
            );
            return Ok(None);
        }

        let disposition = route(self.self_id, &frame.header);
        Ok(Some(Received {
            frame,
            raw,
            disposition,
        }))
    }

    /// Transmit a frame this node originates.
    pub fn send(&self, frame: &Frame) -> io::Result<()> {
        let bytes = frame.encode();
        trace!(
            kind = %frame.header.kind,
            seq = frame.header.seq,
            dest = frame.header.dest.wire(),
            "frame out"
        );
        self.socket.send_to(&bytes, self.successor)?;
        Ok(())
    }

    /// Relay another origin's bytes unchanged.
    pub fn forward(&self, raw: &[u8]) -> io::Result<()> {
        self.socket.send_to(raw, self.successor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{route, Disposition, RingFilter};
    use copas_core::model::node::NodeId;
    use copas_proto::{Dest, Header, MsgKind};

    fn header(kind: MsgKind, origin: NodeId, dest: Dest) -> Header {
        Header {
            kind,
            origin,
            dest,
            seq: 7,
        }
    }

    #[test]
    fn own_frame_completes_a_lap() {
        let h = header(MsgKind::PlayCard, NodeId::P2, Dest::Broadcast);
        assert_eq!(route(NodeId::P2, &h), Disposition::Lap);
    }

    #[test]
    fn broadcast_delivers_and_forwards() {
        let h = header(MsgKind::PlayCard, NodeId::P1, Dest::Broadcast);
        assert_eq!(route(NodeId::P3, &h), Disposition::DeliverAndForward);
    }

    #[test]
    fn foreign_unicast_only_forwards() {
        let h = header(MsgKind::DealHand, NodeId::P0, Dest::Node(NodeId::P2));
        assert_eq!(route(NodeId::P1, &h), Disposition::ForwardOnly);
        assert_eq!(route(NodeId::P2, &h), Disposition::DeliverAndForward);
    }

    #[test]
    fn coordinator_taps_transiting_pass_cards() {
        let h = header(MsgKind::PassCards, NodeId::P1, Dest::Node(NodeId::P2));
        assert_eq!(route(NodeId::P0, &h), Disposition::DeliverAndForward);
        // Other bystanders still only forward.
        assert_eq!(route(NodeId::P3, &h), Disposition::ForwardOnly);
    }

    #[test]
    fn token_pass_is_not_tapped() {
        let h = header(MsgKind::TokenPass, NodeId::P1, Dest::Node(NodeId::P2));
        assert_eq!(route(NodeId::P0, &h), Disposition::ForwardOnly);
    }

    #[test]
    fn filter_drops_repeats_and_allows_fresh_seq() {
        let mut filter = RingFilter::new();
        let first = header(MsgKind::PlayCard, NodeId::P1, Dest::Broadcast);
        assert!(!filter.is_duplicate(&first));
        assert!(filter.is_duplicate(&first));

        let next = Header { seq: 8, ..first };
        assert!(!filter.is_duplicate(&next));

        // A different origin has its own slot.
        let other = header(MsgKind::PlayCard, NodeId::P2, Dest::Broadcast);
        assert!(!filter.is_duplicate(&other));
    }
}
